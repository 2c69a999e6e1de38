//! Rendering entry points and the object model, with an in-process renderer.

mod common;

use common::{init_tracing, pdf_bytes, LETTER};
use futures::future::BoxFuture;
use pdfpress::{
    load, render_sync, render_to_buffer, render_to_file, render_to_object, HtmlRenderer,
    PdfObject, PdfPressError, PdfSource, PipelineConfig, RenderOptions, RenderOverrides,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns a fixed PDF and remembers the options of every call.
struct StubRenderer {
    pdf: Vec<u8>,
    calls: Mutex<Vec<(String, RenderOptions)>>,
}

impl StubRenderer {
    fn new(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pdf: pdf_bytes(pages, LETTER, "rendered"),
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl HtmlRenderer for StubRenderer {
    fn render<'a>(
        &'a self,
        html: &'a str,
        options: &'a RenderOptions,
    ) -> BoxFuture<'a, Result<Vec<u8>, PdfPressError>> {
        self.calls
            .lock()
            .unwrap()
            .push((html.to_string(), options.clone()));
        let pdf = self.pdf.clone();
        Box::pin(async move { Ok(pdf) })
    }
}

struct NeverFinishes;

impl HtmlRenderer for NeverFinishes {
    fn render<'a>(
        &'a self,
        _html: &'a str,
        _options: &'a RenderOptions,
    ) -> BoxFuture<'a, Result<Vec<u8>, PdfPressError>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        })
    }
}

fn config_with(renderer: Arc<dyn HtmlRenderer>) -> PipelineConfig {
    PipelineConfig::builder().renderer(renderer).build().unwrap()
}

#[tokio::test]
async fn render_to_object_is_buffer_backed_and_measured() {
    init_tracing();
    let config = config_with(StubRenderer::new(2));

    let obj = render_to_object("<h1>Hi</h1>", &RenderOverrides::default(), &config)
        .await
        .unwrap();

    assert!(!obj.is_file_backed());
    assert!(matches!(obj.source(), PdfSource::Buffer(_)));
    assert_eq!(obj.meta().page_count, 2);
    assert_eq!(obj.meta().width_in, "8.5in");
    assert_eq!(obj.meta().height_in, "11in");
}

#[tokio::test]
async fn render_to_file_persists_with_same_meta() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested/dir/doc.pdf");
    let config = config_with(StubRenderer::new(1));

    let obj = render_to_file("<p/>", &path, &RenderOverrides::default(), &config)
        .await
        .unwrap();

    assert_eq!(obj.file_path(), Some(path.as_path()));
    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(obj.meta().size_bytes, on_disk.len() as u64);
    assert_eq!(obj.meta().sha1, pdfpress::content_hash(&on_disk));
}

#[tokio::test]
async fn caller_overrides_merge_over_config_defaults() {
    let stub = StubRenderer::new(1);
    let config = PipelineConfig::builder()
        .renderer(stub.clone())
        .margin("1in")
        .build()
        .unwrap();
    let overrides = RenderOverrides::from_json(r#"{"width": "10in"}"#).unwrap();

    render_to_buffer("<p>x</p>", &overrides, &config).await.unwrap();

    let calls = stub.calls.lock().unwrap();
    let (html, opts) = &calls[0];
    assert_eq!(html, "<p>x</p>");
    assert_eq!(opts.page_width, "10in");
    assert_eq!(opts.page_height, "11in");
    assert_eq!(opts.margins.top, "1in");
    assert_eq!(opts.timeout_ms, 120_000);
}

#[tokio::test]
async fn slow_renderer_times_out() {
    let config = config_with(Arc::new(NeverFinishes));
    let err = render_to_buffer("<p/>", &RenderOverrides::default().timeout_ms(50), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfPressError::RenderTimeout { timeout_ms: 50 }));
}

#[test]
fn render_sync_runs_without_a_runtime() {
    let config = config_with(StubRenderer::new(3));
    let obj = render_sync("<p/>", &RenderOverrides::default(), &config).unwrap();
    assert_eq!(obj.meta().page_count, 3);
}

#[tokio::test]
async fn file_and_buffer_agree_on_identity() {
    let tmp = tempfile::tempdir().unwrap();
    let bytes = pdf_bytes(4, [0, 0, 595, 842], "a4");
    let path = tmp.path().join("a4.pdf");
    std::fs::write(&path, &bytes).unwrap();
    let config = PipelineConfig::default();

    let from_file = PdfObject::from_file(&path, config.inch_precision).await.unwrap();
    let from_buf = PdfObject::from_buffer(bytes, config.inch_precision).await.unwrap();

    assert_eq!(from_file.meta(), from_buf.meta());
    assert_ne!(from_file.id(), from_buf.id());
}

#[test]
fn load_dispatches_on_input_kind() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("in.pdf");
    std::fs::write(&path, pdf_bytes(1, LETTER, "x")).unwrap();
    let config = PipelineConfig::default();

    tokio_test::block_on(async {
        let a = load(path.as_path(), &config).await.unwrap();
        assert!(a.is_file_backed());

        let b = load(pdf_bytes(1, LETTER, "x"), &config).await.unwrap();
        assert!(!b.is_file_backed());
        assert_eq!(a.meta().sha1, b.meta().sha1);

        let empty = load(Vec::<u8>::new(), &config).await.unwrap_err();
        assert!(matches!(empty, PdfPressError::InvalidInput { .. }));

        let missing = load("/no/such/file.pdf", &config).await.unwrap_err();
        assert!(matches!(missing, PdfPressError::FileNotFound { .. }));
    });
}

#[tokio::test]
async fn persisted_buffer_becomes_transformable_source() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_with(StubRenderer::new(1));
    let obj = render_to_object("<p/>", &RenderOverrides::default(), &config)
        .await
        .unwrap();

    let on_disk = obj.persist(tmp.path().join("doc.pdf")).await.unwrap();

    assert!(on_disk.is_file_backed());
    assert_eq!(on_disk.meta(), obj.meta());
    assert_eq!(&*on_disk.bytes().await.unwrap(), &*obj.bytes().await.unwrap());
}
