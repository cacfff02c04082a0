use std::path::PathBuf;

use roadside::{
    classify, Category, DispatchConfig, Dispatcher, GeoPoint, IssueReport, NewMechanic,
    RequestStatus, Skill, Store,
};

const MECHANIC_AT: (f64, f64) = (12.9716, 77.5946);
const USER_AT: (f64, f64) = (12.9720, 77.5950);

fn temp_db(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("roadside-it-{}-{name}", std::process::id()))
        .join("dispatch.db")
}

fn register_tyre_mechanic(store: &Store) -> i64 {
    store
        .register_mechanic(
            &NewMechanic::new("test_mech", Skill::Tyre)
                .with_phone("1234567890")
                .with_location(GeoPoint::new(MECHANIC_AT.0, MECHANIC_AT.1).unwrap()),
        )
        .unwrap()
        .id
}

#[test]
fn tyre_request_full_lifecycle() {
    let store = Store::open_in_memory().unwrap();
    let mechanic_id = register_tyre_mechanic(&store);
    let dispatcher = Dispatcher::new(store, DispatchConfig::default());

    let report = IssueReport::new(
        "I have a flat tyre near MG Road",
        GeoPoint::new(USER_AT.0, USER_AT.1).unwrap(),
    );
    let receipt = dispatcher.submit("test_user", &report).unwrap();

    assert_eq!(receipt.category, Category::Tyre);
    assert!(receipt.confidence > 0.5);
    assert_eq!(receipt.status, RequestStatus::Assigned);
    assert_eq!(
        receipt.mechanic.as_ref().map(|m| m.name.as_str()),
        Some("test_mech")
    );

    let view = dispatcher.status(receipt.request_id).unwrap();
    assert_eq!(view.status, RequestStatus::Assigned);
    assert_eq!(view.mechanic.as_deref(), Some("test_mech"));

    let store = dispatcher.store();
    let dashboard = store
        .requests_for_mechanic(mechanic_id, Some(RequestStatus::Assigned))
        .unwrap();
    assert_eq!(dashboard.len(), 1);

    store.accept(receipt.request_id, mechanic_id).unwrap();
    assert_eq!(
        dispatcher.status(receipt.request_id).unwrap().status,
        RequestStatus::OnTheWay
    );

    store.complete(receipt.request_id, mechanic_id).unwrap();
    assert_eq!(
        dispatcher.status(receipt.request_id).unwrap().status,
        RequestStatus::Completed
    );
    assert!(store.mechanic(mechanic_id).unwrap().available);
}

#[test]
fn emergency_text_is_classified_as_accident() {
    let result = classify("Accident on flyover! Need help!");
    assert_eq!(result.category, Category::Accident);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn mechanic_claimed_through_one_connection_is_busy_for_another() {
    let path = temp_db("shared");

    let first = Dispatcher::new(Store::open(&path).unwrap(), DispatchConfig::default());
    register_tyre_mechanic(first.store());
    let second = Dispatcher::new(Store::open(&path).unwrap(), DispatchConfig::default());

    let report = IssueReport::new("puncture", GeoPoint::new(USER_AT.0, USER_AT.1).unwrap());
    let a = first.submit("a", &report).unwrap();
    let b = second.submit("b", &report).unwrap();

    assert!(a.is_assigned());
    assert!(!b.is_assigned());
    assert_eq!(b.status, RequestStatus::Open);

    // Once the first job is done the second dispatcher can pick it up
    let mechanic_id = a.mechanic.as_ref().map(|m| m.id).unwrap();
    first.store().accept(a.request_id, mechanic_id).unwrap();
    first.store().complete(a.request_id, mechanic_id).unwrap();

    let retried = second.redispatch(b.request_id).unwrap();
    assert_eq!(retried.mechanic.map(|m| m.id), Some(mechanic_id));

    drop(first);
    drop(second);
    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).unwrap();
    }
}

#[test]
fn location_update_changes_who_is_nearest() {
    let store = Store::open_in_memory().unwrap();
    let a = store
        .register_mechanic(
            &NewMechanic::new("a", Skill::Engine).with_location(GeoPoint::unchecked(12.97, 77.59)),
        )
        .unwrap()
        .id;
    let b = store
        .register_mechanic(
            &NewMechanic::new("b", Skill::Engine).with_location(GeoPoint::unchecked(13.5, 78.0)),
        )
        .unwrap()
        .id;

    store.update_location(a, GeoPoint::unchecked(14.0, 79.0)).unwrap();
    store.update_location(b, GeoPoint::unchecked(12.9721, 77.5951)).unwrap();

    let dispatcher = Dispatcher::new(store, DispatchConfig::default());
    let receipt = dispatcher
        .submit(
            "user",
            &IssueReport::new("engine noise", GeoPoint::unchecked(USER_AT.0, USER_AT.1)),
        )
        .unwrap();
    assert_eq!(receipt.mechanic.map(|m| m.id), Some(b));
}
