//! Shared fixtures for integration tests: lopdf-built PDFs and a shell
//! script that stands in for the typesetting engine.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

pub const LETTER: [i64; 4] = [0, 0, 612, 792];

/// Route library logs to the test harness. Honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pdfpress=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A PDF with `pages` empty pages of `media_box`. `tag` goes into the Info
/// dictionary so fixtures with equal geometry differ in content.
pub fn pdf_bytes(pages: usize, media_box: [i64; 4], tag: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.iter().map(|&v| v.into()).collect::<Vec<Object>>(),
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(tag),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save fixture PDF");
    buf
}

/// Write a fixture PDF to `dir/name` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: usize, tag: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(pages, LETTER, tag)).expect("write fixture PDF");
    path
}

/// How the fake engine behaves.
pub enum FakeEngine<'a> {
    /// Copy this PDF to `<output-directory>/<jobname>.pdf` and exit 0.
    Produces(&'a Path),
    /// Exit with this code without writing anything.
    ExitsWith(i32),
    /// Print to stderr, then exit 0.
    WritesStderr(&'a str),
}

/// Write an executable `sh` script emulating `pdflatex` into `dir`.
///
/// Every invocation also appends its arguments to `<output-directory>/engine-args.txt`.
#[cfg(unix)]
pub fn fake_engine(dir: &Path, behaviour: FakeEngine<'_>) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let action = match behaviour {
        FakeEngine::Produces(fixture) => {
            format!("cp '{}' \"$out/$job.pdf\"\nexit 0", fixture.display())
        }
        FakeEngine::ExitsWith(code) => format!("exit {code}"),
        FakeEngine::WritesStderr(msg) => format!("echo '{msg}' >&2\nexit 0"),
    };
    let script = format!(
        r#"#!/bin/sh
job=""
out="."
for arg in "$@"; do
  case "$arg" in
    -jobname=*) job="${{arg#-jobname=}}" ;;
    -output-directory=*) out="${{arg#-output-directory=}}" ;;
  esac
done
echo "$@" >> "$out/engine-args.txt"
{action}
"#
    );

    let path = dir.join("fake-pdflatex");
    std::fs::write(&path, script).expect("write fake engine");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake engine");
    path
}
