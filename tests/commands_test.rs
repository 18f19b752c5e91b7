mod common;

use common::{MockSubaruClient, MockVehicle, VIN_EV, VIN_G2};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::watch;
use tribeca::commands::{CommandDispatcher, RemoteCommand};
use tribeca::config::PollingConfig;
use tribeca::coordinator::{Coordinator, CoordinatorHandle};
use tribeca::notify::Notifier;
use tribeca::starlink::SubaruClient;
use tribeca::vehicle::VehicleInfo;

struct Harness {
    mock: Arc<MockSubaruClient>,
    dispatcher: CommandDispatcher,
    notifier: Notifier,
    _options: watch::Sender<PollingConfig>,
}

/// Wire a dispatcher with a running coordinator task. Waits out the
/// coordinator's immediate initial refresh, then clears the call log so
/// assertions only see command-driven traffic.
async fn harness(vehicles: Vec<MockVehicle>) -> Harness {
    let mock = Arc::new(MockSubaruClient::new(vehicles));
    let client: Arc<dyn SubaruClient> = mock.clone();
    let infos: HashMap<String, VehicleInfo> = client
        .vehicles()
        .into_iter()
        .map(|vin| {
            let info = VehicleInfo::from_client(client.as_ref(), &vin);
            (vin, info)
        })
        .collect();

    let (options, options_rx) = watch::channel(PollingConfig {
        scan_interval_secs: 3600,
        hard_poll_interval_secs: 7200,
    });
    let (coordinator, handle): (Coordinator, CoordinatorHandle) =
        Coordinator::new(client.clone(), infos.clone(), options_rx);
    tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let notifier = Notifier::new();
    let dispatcher = CommandDispatcher::new(client, Arc::new(infos), handle, notifier.clone());

    mock.clear_calls();
    Harness {
        mock,
        dispatcher,
        notifier,
        _options: options,
    }
}

fn messages(notifier: &Notifier) -> Vec<String> {
    notifier.active().iter().map(|n| n.message.clone()).collect()
}

#[tokio::test]
async fn unknown_vin_is_rejected_before_any_api_call() {
    let h = harness(vec![MockVehicle::g2(VIN_G2)]).await;

    let err = h
        .dispatcher
        .execute(RemoteCommand::Lock, "JF2XXXXX0X0009999")
        .await
        .unwrap_err();
    assert!(matches!(err, tribeca::TribecaError::UnknownVehicle { .. }));

    assert!(h.mock.calls().is_empty());
    let msgs = messages(&h.notifier);
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("ERROR - Invalid VIN: JF2XXXXX0X0009999"));
}

#[tokio::test]
async fn vin_is_normalized_to_uppercase() {
    let h = harness(vec![MockVehicle::g2(VIN_G2)]).await;

    let ok = h
        .dispatcher
        .execute(RemoteCommand::Horn, &VIN_G2.to_lowercase())
        .await
        .unwrap();
    assert!(ok);
    assert_eq!(h.mock.count("horn", VIN_G2), 1);
}

#[tokio::test]
async fn wrong_pin_yields_the_pin_specific_notification() {
    let h = harness(vec![MockVehicle::g2(VIN_G2)]).await;
    h.mock.invalid_pin.store(true, Ordering::SeqCst);

    let err = h
        .dispatcher
        .execute(RemoteCommand::Unlock, VIN_G2)
        .await
        .unwrap_err();
    assert!(err.is_invalid_pin());

    let msgs = messages(&h.notifier);
    assert!(msgs.iter().any(|m| m == "ERROR - Invalid PIN"));
    assert!(!msgs.iter().any(|m| m.contains("Command failed")));
    // The progress card was dismissed
    assert!(!msgs.iter().any(|m| m.contains("Calling Subaru Service")));
}

#[tokio::test]
async fn generic_failure_notifies_command_failed() {
    let h = harness(vec![MockVehicle::g2(VIN_G2)]).await;
    h.mock.fail_commands.store(true, Ordering::SeqCst);

    let ok = h
        .dispatcher
        .execute(RemoteCommand::Lock, VIN_G2)
        .await
        .unwrap();
    assert!(!ok);

    let msgs = messages(&h.notifier);
    assert!(
        msgs.iter()
            .any(|m| m.contains(&format!("ERROR - Command failed: lock:{}", VIN_G2)))
    );
    assert!(!msgs.iter().any(|m| m == "ERROR - Invalid PIN"));
}

#[tokio::test]
async fn successful_lock_does_not_trigger_a_refresh() {
    let h = harness(vec![MockVehicle::g2(VIN_G2)]).await;

    let ok = h
        .dispatcher
        .execute(RemoteCommand::Lock, VIN_G2)
        .await
        .unwrap();
    assert!(ok);

    assert_eq!(h.mock.count("lock", VIN_G2), 1);
    assert_eq!(h.mock.count("fetch", VIN_G2), 0);
    let msgs = messages(&h.notifier);
    assert!(
        msgs.iter()
            .any(|m| m.contains(&format!("Command completed: lock:{}", VIN_G2)))
    );
}

#[tokio::test]
async fn successful_state_changing_command_triggers_refresh() {
    let h = harness(vec![MockVehicle::g2(VIN_G2)]).await;

    let ok = h
        .dispatcher
        .execute(RemoteCommand::RemoteStart, VIN_G2)
        .await
        .unwrap();
    assert!(ok);

    assert_eq!(h.mock.count("remote_start", VIN_G2), 1);
    // The post-command refresh fetched fresh data
    assert_eq!(h.mock.count("fetch", VIN_G2), 1);
}

#[tokio::test]
async fn update_command_forces_a_hard_poll() {
    let h = harness(vec![MockVehicle::g2(VIN_G2)]).await;

    let ok = h
        .dispatcher
        .execute(RemoteCommand::Update, VIN_G2)
        .await
        .unwrap();
    assert!(ok);

    // The initial refresh already stamped the hard-poll time; only an
    // override explains a second live poll this soon
    assert_eq!(h.mock.count("update", VIN_G2), 1);
    assert_eq!(h.mock.count("fetch", VIN_G2), 1);
}

#[tokio::test]
async fn fetch_command_refreshes_without_notifications() {
    let h = harness(vec![MockVehicle::ev(VIN_EV)]).await;

    let ok = h
        .dispatcher
        .execute(RemoteCommand::Fetch, VIN_EV)
        .await
        .unwrap();
    assert!(ok);

    assert_eq!(h.mock.count("fetch", VIN_EV), 1);
    assert!(h.notifier.active().is_empty());
}

#[tokio::test]
async fn registered_services_are_the_union_across_vehicles() {
    let h = harness(vec![
        MockVehicle::no_safety(VIN_G2),
        MockVehicle::ev(VIN_EV),
    ]).await;

    assert!(h.dispatcher.is_registered(RemoteCommand::ChargeStart));
    assert!(h.dispatcher.is_registered(RemoteCommand::Lock));
    assert!(h.dispatcher.is_registered(RemoteCommand::Fetch));

    let only_safety = harness(vec![{
        let mut v = MockVehicle::g2(VIN_G2);
        v.has_remote_service = false;
        v.has_remote_start = false;
        v
    }])
    .await;
    assert!(only_safety.dispatcher.is_registered(RemoteCommand::Fetch));
    assert!(!only_safety.dispatcher.is_registered(RemoteCommand::Lock));
    assert!(
        !only_safety
            .dispatcher
            .is_registered(RemoteCommand::ChargeStart)
    );
}
