//! End-to-end tests over real sockets: one dispatcher per connection,
//! events observed through an injected recording sink.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

use vital_relay::common::config::DoctorConfig;
use vital_relay::common::connection::Connection;
use vital_relay::common::messages::Message;
use vital_relay::doctor::{DispatchEvent, Dispatcher, DoctorServer, EventSink};

/// Records every dispatch event on a channel so tests can assert on them.
struct ChannelSink(mpsc::UnboundedSender<DispatchEvent>);

impl EventSink for ChannelSink {
    fn emit(&self, event: DispatchEvent) {
        let _ = self.0.send(event);
    }
}

fn channel_sink() -> (Arc<ChannelSink>, mpsc::UnboundedReceiver<DispatchEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelSink(tx)), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<DispatchEvent>) -> DispatchEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Accept one connection and run a dispatcher on it, storing files under
/// `received_root`. Returns the address to connect to and the dispatcher's
/// join handle.
async fn spawn_single_dispatcher(
    received_root: PathBuf,
    sink: Arc<ChannelSink>,
) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        Dispatcher::new(Connection::new(socket), received_root, sink)
            .run()
            .await;
    });

    (addr, handle)
}

fn sample_vitals(patient_id: u32) -> Message {
    Message::Vitals {
        patient_id,
        temperature: 36.8,
        heart_rate: 72,
        oxygen_level: 98,
        note: "feeling fine".to_string(),
    }
}

#[tokio::test]
async fn vitals_then_file_dispatched_in_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let (sink, mut events) = channel_sink();
    let (addr, handle) = spawn_single_dispatcher(dir.path().to_path_buf(), sink).await;

    let mut conn = Connection::connect(&addr.to_string()).await.unwrap();
    conn.write_message(&sample_vitals(101)).await.unwrap();
    conn.write_message(&Message::file_transfer(
        101,
        "bloodwork.pdf".to_string(),
        vec![0xDE, 0xAD, 0xBE, 0xEF],
        "lab_report".to_string(),
        "quarterly bloodwork".to_string(),
    ))
    .await
    .unwrap();

    match next_event(&mut events).await {
        DispatchEvent::VitalsReport {
            patient_id,
            heart_rate,
            note,
            ..
        } => {
            assert_eq!(patient_id, 101);
            assert_eq!(heart_rate, 72);
            assert_eq!(note, "feeling fine");
        }
        other => panic!("expected VitalsReport first, got {:?}", other),
    }

    match next_event(&mut events).await {
        DispatchEvent::FileSaved {
            patient_id,
            path,
            byte_len,
            file_type,
            ..
        } => {
            assert_eq!(patient_id, 101);
            assert_eq!(byte_len, 4);
            assert_eq!(file_type, "lab_report");
            assert_eq!(path, dir.path().join("Patient_101").join("bloodwork.pdf"));
            assert_eq!(
                std::fs::read(&path).unwrap(),
                vec![0xDE, 0xAD, 0xBE, 0xEF]
            );
        }
        other => panic!("expected FileSaved second, got {:?}", other),
    }

    drop(conn);
    assert_eq!(next_event(&mut events).await, DispatchEvent::Disconnected);
    timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn clean_disconnect_ends_loop_without_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let (sink, mut events) = channel_sink();
    let (addr, handle) = spawn_single_dispatcher(dir.path().to_path_buf(), sink).await;

    let conn = Connection::connect(&addr.to_string()).await.unwrap();
    drop(conn);

    assert_eq!(next_event(&mut events).await, DispatchEvent::Disconnected);
    timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn garbage_on_the_wire_is_a_decode_failure() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let (sink, mut events) = channel_sink();
    let (addr, handle) = spawn_single_dispatcher(dir.path().to_path_buf(), sink).await;

    // A well-framed payload that is not a valid message.
    use tokio::io::AsyncWriteExt;
    let mut raw = tokio::net::TcpStream::connect(addr).await.unwrap();
    let junk = b"this is not json";
    raw.write_all(&(junk.len() as u32).to_be_bytes()).await.unwrap();
    raw.write_all(junk).await.unwrap();
    raw.flush().await.unwrap();

    match next_event(&mut events).await {
        DispatchEvent::DecodeFailed { .. } => {}
        other => panic!("expected DecodeFailed, got {:?}", other),
    }
    timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn file_save_failure_keeps_connection_alive() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    // Make Patient_101 an existing *file* so create_dir_all fails.
    let blocker = dir.path().join("Patient_101");
    std::fs::write(&blocker, b"in the way").unwrap();

    let (sink, mut events) = channel_sink();
    let (addr, _handle) = spawn_single_dispatcher(dir.path().to_path_buf(), sink).await;

    let mut conn = Connection::connect(&addr.to_string()).await.unwrap();
    conn.write_message(&Message::file_transfer(
        101,
        "scan.png".to_string(),
        vec![1, 2, 3],
        "image".to_string(),
        String::new(),
    ))
    .await
    .unwrap();

    match next_event(&mut events).await {
        DispatchEvent::FileSaveFailed {
            patient_id,
            file_name,
            ..
        } => {
            assert_eq!(patient_id, 101);
            assert_eq!(file_name, "scan.png");
        }
        other => panic!("expected FileSaveFailed, got {:?}", other),
    }

    // The dispatcher must still be reading: a vitals message after the
    // failed save is processed normally.
    conn.write_message(&sample_vitals(101)).await.unwrap();
    match next_event(&mut events).await {
        DispatchEvent::VitalsReport { patient_id, .. } => assert_eq!(patient_id, 101),
        other => panic!("expected VitalsReport after failed save, got {:?}", other),
    }
}

#[tokio::test]
async fn concurrent_patients_save_same_file_name_in_distinct_directories() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    let config = DoctorConfig {
        listen: vital_relay::common::config::ListenConfig {
            address: "127.0.0.1:0".to_string(),
        },
        storage: vital_relay::common::config::StorageConfig {
            received_root: dir.path().to_path_buf(),
        },
    };

    let (sink, mut events) = channel_sink();
    let server = DoctorServer::bind(&config, sink).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let mut conn_a = Connection::connect(&addr.to_string()).await.unwrap();
    let mut conn_b = Connection::connect(&addr.to_string()).await.unwrap();

    conn_a
        .write_message(&Message::file_transfer(
            1,
            "report.pdf".to_string(),
            b"patient one".to_vec(),
            "document".to_string(),
            String::new(),
        ))
        .await
        .unwrap();
    conn_b
        .write_message(&Message::file_transfer(
            2,
            "report.pdf".to_string(),
            b"patient two".to_vec(),
            "document".to_string(),
            String::new(),
        ))
        .await
        .unwrap();

    // Two saves, one per patient, in whichever order the tasks ran.
    let mut saved_ids = Vec::new();
    for _ in 0..2 {
        match next_event(&mut events).await {
            DispatchEvent::FileSaved { patient_id, .. } => saved_ids.push(patient_id),
            other => panic!("expected FileSaved, got {:?}", other),
        }
    }
    saved_ids.sort_unstable();
    assert_eq!(saved_ids, vec![1, 2]);

    assert_eq!(
        std::fs::read(dir.path().join("Patient_1").join("report.pdf")).unwrap(),
        b"patient one"
    );
    assert_eq!(
        std::fs::read(dir.path().join("Patient_2").join("report.pdf")).unwrap(),
        b"patient two"
    );
}
