use vault_export::{
    ExportSettings, FailureKind, LicenseSource, ReqwestTransfer, Strategy, Transfer,
    LICENCE_FILENAME,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transfer_for(server: &MockServer) -> ReqwestTransfer {
    let settings = ExportSettings {
        api_base_url: server.uri(),
        bearer_token: Some("t0k3n".into()),
        ..ExportSettings::default()
    };
    ReqwestTransfer::new(&settings).expect("client")
}

#[tokio::test]
async fn direct_fetch_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cdn/42.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;

    let transfer = transfer_for(&server);
    let strategy = Strategy::Direct {
        url: format!("{}/cdn/42.png", server.uri()),
    };

    let bytes = transfer
        .fetch(&strategy, &CancellationToken::new())
        .await
        .expect("fetch ok");
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[tokio::test]
async fn api_and_watermark_requests_carry_bearer_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/42/download"))
        .and(header("authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_string("original"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/42/watermarked"))
        .and(header("authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_string("marked"))
        .mount(&server)
        .await;

    let transfer = transfer_for(&server);
    let cancel = CancellationToken::new();

    let original = transfer
        .fetch(&Strategy::Api { item_id: "42".into() }, &cancel)
        .await
        .unwrap();
    let marked = transfer
        .fetch(&Strategy::Watermark { item_id: "42".into() }, &cancel)
        .await
        .unwrap();

    assert_eq!(original, b"original");
    assert_eq!(marked, b"marked");
}

#[tokio::test]
async fn api_base_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/files/9/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let settings = ExportSettings {
        api_base_url: format!("{}/api/v1/", server.uri()),
        ..ExportSettings::default()
    };
    let transfer = ReqwestTransfer::new(&settings).unwrap();

    let bytes = transfer
        .fetch(&Strategy::Api { item_id: "9".into() }, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(bytes, b"ok");
}

#[tokio::test]
async fn http_statuses_map_to_failure_kinds() {
    let server = MockServer::start().await;
    for (status, route) in [(404u16, "/missing"), (401, "/denied"), (403, "/forbidden"), (500, "/broken")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let transfer = transfer_for(&server);
    let cancel = CancellationToken::new();
    let kind_of = |route: &str| Strategy::Direct {
        url: format!("{}{route}", server.uri()),
    };

    let cases = [
        ("/missing", FailureKind::NotFound),
        ("/denied", FailureKind::Unauthorized),
        ("/forbidden", FailureKind::Unauthorized),
        ("/broken", FailureKind::Unknown),
    ];
    for (route, expected) in cases {
        let err = transfer.fetch(&kind_of(route), &cancel).await.unwrap_err();
        assert_eq!(err.kind, expected, "route {route}");
    }
}

#[tokio::test]
async fn unreachable_host_is_a_network_failure() {
    let transfer = ReqwestTransfer::new(&ExportSettings::default()).unwrap();
    let strategy = Strategy::Direct {
        url: "http://127.0.0.1:9/nothing-listens-here".into(),
    };

    let err = transfer
        .fetch(&strategy, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let settings = ExportSettings {
        max_bytes: 10,
        ..ExportSettings::default()
    };
    let transfer = ReqwestTransfer::new(&settings).unwrap();
    let strategy = Strategy::Direct {
        url: format!("{}/large", server.uri()),
    };

    let err = transfer
        .fetch(&strategy, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Unknown);
    assert!(err.message.contains("too large"));
}

#[tokio::test]
async fn cancelled_token_aborts_transfer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(5))
                .set_body_string("late"),
        )
        .mount(&server)
        .await;

    let transfer = transfer_for(&server);
    let cancel = CancellationToken::new();
    let strategy = Strategy::Direct {
        url: format!("{}/slow", server.uri()),
    };

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = transfer.fetch(&strategy, &cancel).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Cancelled);
}

#[tokio::test]
async fn licence_text_becomes_synthetic_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exports/license"))
        .respond_with(ResponseTemplate::new(200).set_body_string("All rights reserved."))
        .mount(&server)
        .await;

    let transfer = transfer_for(&server);
    let entry = transfer
        .licence_entry(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(entry.name, LICENCE_FILENAME);
    assert_eq!(entry.content.as_bytes(), b"All rights reserved.");
}
