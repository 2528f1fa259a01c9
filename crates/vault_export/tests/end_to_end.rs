use std::io::{Cursor, Read};
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vault_export::{
    DirectorySaver, ExportJob, ExportOptions, ExportSettings, LicenseSource, NullSink,
    ReqwestTransfer, SelectableItem,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn http_export_with_watermark_fallback_and_licence() {
    vault_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/1/watermarked"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cdn/1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/2/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exports/license"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Use granted."))
        .mount(&server)
        .await;

    let settings = ExportSettings {
        api_base_url: server.uri(),
        bearer_token: Some("secret".into()),
        tick_interval_ms: 10,
        ..ExportSettings::default()
    };
    let transfer = Arc::new(ReqwestTransfer::new(&settings).unwrap());
    let out = TempDir::new().unwrap();

    let mut options = ExportOptions {
        watermark: true,
        ..ExportOptions::default()
    };
    options.push_synthetic(
        transfer
            .licence_entry(&CancellationToken::new())
            .await
            .unwrap(),
    );

    let items = vec![
        SelectableItem::new("1", "beach", "image/jpeg")
            .with_url(format!("{}/cdn/1.jpg", server.uri()))
            .with_fingerprint("FP-1"),
        SelectableItem::new("2", "invoice", "application/pdf")
            .with_url(format!("{}/cdn/expired.pdf", server.uri())),
    ];

    let job = ExportJob::new(
        &settings,
        transfer,
        Arc::new(DirectorySaver::new(out.path().to_path_buf())),
        Arc::new(NullSink),
    );
    let report = job.run(items, options).await.unwrap();

    assert_eq!(report.archive_name, "files_export.zip");
    assert_eq!(report.tally.succeeded, 2);

    let saved = std::fs::read(out.path().join("files_export.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(saved)).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["LICENCE.txt", "beach.jpg", "invoice.pdf"]);

    let mut licence = String::new();
    archive
        .by_name("LICENCE.txt")
        .unwrap()
        .read_to_string(&mut licence)
        .unwrap();
    assert_eq!(licence, "Use granted.");
}
