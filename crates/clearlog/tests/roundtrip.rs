//! End-to-end round trips through the sign-then-encrypt pipeline.

use clearlog::{AccessLog, JweEnvelope};
use clearlog_testkit::TestBench;
use serde_json::Value;

#[tokio::test]
async fn monitor_delivers_to_owner() {
    let bench = TestBench::new();
    let log = bench.sample_access_log();
    let signed = bench.monitor.sign_access_log(&log).unwrap();

    let token = bench
        .monitor
        .encrypt_log(&signed, &[bench.owner.as_remote().clone()])
        .await
        .unwrap();
    let received = bench
        .owner
        .decrypt_log(&token, &bench.resolver)
        .await
        .unwrap();

    assert_eq!(received.extract(), log);
}

#[tokio::test]
async fn every_receiver_decrypts_the_same_event() {
    let bench = TestBench::new();
    let log = bench.sample_access_log();
    let signed = bench.monitor.sign_access_log(&log).unwrap();

    // The owner shares with themselves and the receiver.
    let receivers = [
        bench.owner.as_remote().clone(),
        bench.receiver.as_remote().clone(),
    ];
    let token = bench.owner.encrypt_log(&signed, &receivers).await.unwrap();

    for user in [&bench.owner, &bench.receiver] {
        let received = user.decrypt_log(&token, &bench.resolver).await.unwrap();
        let extracted = received.extract();
        assert_eq!(extracted.id, log.id);
        assert_eq!(extracted, log);
    }
}

#[tokio::test]
async fn owner_reshares_a_received_log() {
    let mut bench = TestBench::new();
    let carol = bench.add_user("carol");
    let log = bench.sample_access_log();
    let signed = bench.monitor.sign_access_log(&log).unwrap();

    // Delivery: monitor to owner.
    let token = bench
        .monitor
        .encrypt_log(&signed, &[bench.owner.as_remote().clone()])
        .await
        .unwrap();
    let received = bench
        .owner
        .decrypt_log(&token, &bench.resolver)
        .await
        .unwrap();

    // Re-share: owner to a new recipient set; the monitor signature
    // travels unchanged.
    let reshared = bench
        .owner
        .encrypt_log(
            &received,
            &[
                bench.receiver.as_remote().clone(),
                carol.as_remote().clone(),
            ],
        )
        .await
        .unwrap();

    for user in [&bench.receiver, &carol] {
        let log_again = user
            .decrypt_log(&reshared, &bench.resolver)
            .await
            .unwrap()
            .extract();
        assert_eq!(log_again, log);
    }
}

#[tokio::test]
async fn accepts_sibling_single_recipient_shape() {
    let bench = TestBench::new();
    let log = bench.sample_access_log();
    let signed = bench.monitor.sign_access_log(&log).unwrap();

    let token = bench
        .monitor
        .encrypt_log(&signed, &[bench.owner.as_remote().clone()])
        .await
        .unwrap();

    // Reshape into the sibling encoders' single-recipient form, where
    // encrypted_key and header sit at the top level.
    let mut value: Value = serde_json::from_str(&token).unwrap();
    let recipient = value["recipients"][0].clone();
    let object = value.as_object_mut().unwrap();
    object.remove("recipients");
    object.insert("encrypted_key".into(), recipient["encrypted_key"].clone());
    object.insert("header".into(), recipient["header"].clone());
    let flattened = serde_json::to_string(&value).unwrap();

    let received = bench
        .owner
        .decrypt_log(&flattened, &bench.resolver)
        .await
        .unwrap();
    assert_eq!(received.extract(), log);
}

#[tokio::test]
async fn token_is_general_json_with_duplicated_metadata() {
    let bench = TestBench::new();
    let log = bench.sample_access_log();
    let signed = bench.monitor.sign_access_log(&log).unwrap();

    let receivers = [
        bench.owner.as_remote().clone(),
        bench.receiver.as_remote().clone(),
    ];
    let token = bench.owner.encrypt_log(&signed, &receivers).await.unwrap();

    let envelope = JweEnvelope::from_json(&token).unwrap();
    assert_eq!(envelope.recipients.len(), 2);
    for recipient in &envelope.recipients {
        assert_eq!(recipient.header.alg, "ECDH-ES+A256KW");
        assert_eq!(recipient.header.epk.kty, "EC");
        assert_eq!(recipient.header.epk.crv, "P-256");
    }

    let header = envelope.protected_header().unwrap().unwrap();
    assert_eq!(header.enc, "A256GCM");
    assert_eq!(header.owner, "owner");
    assert_eq!(header.recipients, vec!["owner", "receiver"]);
}

#[tokio::test]
async fn decrypted_pair_is_internally_consistent() {
    let bench = TestBench::new();
    let log = bench.sample_access_log();
    let signed = bench.monitor.sign_access_log(&log).unwrap();

    let token = bench
        .monitor
        .encrypt_log(&signed, &[bench.owner.as_remote().clone()])
        .await
        .unwrap();
    let received = bench
        .owner
        .decrypt_log(&token, &bench.resolver)
        .await
        .unwrap();

    // The returned JWS payload parses back to the extracted event.
    let payload = received.jws().decode_payload().unwrap();
    assert_eq!(AccessLog::from_bytes(&payload).unwrap(), received.extract());
}
