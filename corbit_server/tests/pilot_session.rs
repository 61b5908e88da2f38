mod support;

use corbit_server::domain::RCS;
use corbit_server::interface_adapters::net::{FrameReader, MAX_FRAME_LEN, write_message};
use corbit_server::interface_adapters::snapshot::decode_snapshot;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

async fn connect() -> (FrameReader<OwnedReadHalf>, OwnedWriteHalf) {
    let server = support::ensure_server();
    let stream = TcpStream::connect(&server.pilot_addr)
        .await
        .expect("connect to pilot port");
    let (read_half, write_half) = stream.into_split();
    (FrameReader::new(read_half), write_half)
}

#[tokio::test]
async fn when_empty_batch_is_sent_then_snapshot_comes_back() {
    let (mut reader, mut writer) = connect().await;

    write_message(&mut writer, "").await.expect("send batch");
    let reply = reader.read_message().await.expect("snapshot reply");

    let bodies = decode_snapshot(&reply).expect("reply is a snapshot document");
    let mut names: Vec<&str> = bodies.iter().map(|b| b.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["AC", "Earth", "ISS", "Moon"]);
}

#[tokio::test]
async fn when_rcs_fires_then_fuel_drops_in_later_snapshots() {
    let (mut reader, mut writer) = connect().await;

    write_message(&mut writer, "fire_rcs|AC,0 not-a-command fire_rcs|ghost,0")
        .await
        .expect("send batch");
    reader.read_message().await.expect("first reply");

    // The batch lands on the next tick; poll until a snapshot shows it.
    let mut fuel = f64::MAX;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(40)).await;
        write_message(&mut writer, "").await.expect("poll");
        let reply = reader.read_message().await.expect("poll reply");
        let bodies = decode_snapshot(&reply).expect("snapshot document");
        let ac = bodies.iter().find(|b| b.name == "AC").expect("AC present");
        fuel = ac.engine_system(RCS).expect("rcs").fuel;
        if fuel < 5000.0 {
            break;
        }
    }

    assert!(fuel < 5000.0);
}

#[tokio::test]
async fn when_messages_arrive_back_to_back_then_each_gets_a_reply() {
    let server = support::ensure_server();
    let mut stream = TcpStream::connect(&server.pilot_addr)
        .await
        .expect("connect to pilot port");

    // Two frames in a single write.
    stream.write_all(b";;").await.expect("send frames");
    let mut reader = FrameReader::new(stream);

    for _ in 0..2 {
        let reply = reader.read_message().await.expect("reply");
        assert!(reply.starts_with('{'));
    }
}

#[tokio::test]
async fn when_message_never_ends_then_server_drops_the_session() {
    let (mut reader, mut writer) = connect().await;

    // Send past the frame limit without a delimiter; the server may hang up mid-write.
    let flood = vec![b'x'; MAX_FRAME_LEN + 4096];
    let _ = writer.write_all(&flood).await;

    let reply = tokio::time::timeout(Duration::from_secs(5), reader.read_message())
        .await
        .expect("server should hang up");
    assert!(reply.is_err());
}
