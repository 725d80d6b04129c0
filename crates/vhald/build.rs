//! Build script: render the vhald man page for packaging.

use std::{env, fs, io, path::Path, path::PathBuf};
use time::{OffsetDateTime, format_description::well_known::Iso8601};

const FALLBACK_DATE: &str = "1970-01-01";

/// Release date for the page header, honouring reproducible-build timestamps.
fn manual_date() -> String {
    let Ok(raw) = env::var("SOURCE_DATE_EPOCH") else {
        return FALLBACK_DATE.into();
    };
    let parsed = raw
        .parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .and_then(|moment| moment.format(&Iso8601::DATE).ok());
    parsed.unwrap_or_else(|| {
        println!(
            "cargo:warning=Ignoring SOURCE_DATE_EPOCH '{raw}'; expected integer seconds since \
             the Unix epoch; using {FALLBACK_DATE}"
        );
        FALLBACK_DATE.into()
    })
}

/// `{target}/generated-man/{triple}/{profile}`, derived from OUT_DIR
/// (`{target}/{profile}/build/{crate}-{hash}/out`).
fn man_dir() -> PathBuf {
    let triple = env::var("TARGET").unwrap_or_else(|_| "unknown-target".into());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".into());
    let target_root = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .and_then(|out| out.ancestors().nth(4).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("target"));
    target_root.join(format!("generated-man/{triple}/{profile}"))
}

fn write_page(contents: &str, dir: &Path, name: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let staged = dir.join(format!("{name}.tmp"));
    fs::write(&staged, contents)?;
    let page = dir.join(name);
    if page.exists() {
        fs::remove_file(&page)?;
    }
    fs::rename(&staged, page)
}

fn render(binary: &str, version: &str, date: &str) -> String {
    let title = binary.to_uppercase();
    format!(
        ".TH \"{title}\" \"8\" \"{date}\" \"{binary} {version}\" \"Vehicle Property Service\"\n\
.SH NAME\n\
{binary} \\- vehicle property HAL service\n\
.SH SYNOPSIS\n\
.B {binary}\n\
[\\fB\\-\\-config\\-path\\fR \\fIFILE\\fR] [\\fB\\-\\-log\\-filter\\fR \\fIFILTER\\fR]\n\
.SH DESCRIPTION\n\
{binary} serves vehicle properties to the HAL host, answering get and set\n\
requests from an in-memory store and forwarding writes to the signal-bus\n\
agent while it is reachable.\n\
.SH ENVIRONMENT\n\
Every option may also be set through a \\fBVHAL_\\fR-prefixed variable, for\n\
example \\fBVHAL_PING_TIMEOUT_MS\\fR.\n"
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for variable in ["CARGO_PKG_VERSION", "SOURCE_DATE_EPOCH", "TARGET", "PROFILE"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let binary = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| "vhald".into());
    let version = env::var("CARGO_PKG_VERSION")
        .map_err(|_| "CARGO_PKG_VERSION must be set by Cargo to render the manual page")?;
    let page = render(&binary, &version, &manual_date());
    let name = format!("{binary}.8");

    write_page(&page, &man_dir(), &name)?;
    if let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from)
        && let Err(error) = write_page(&page, &out_dir, &name)
    {
        println!(
            "cargo:warning=Failed to stage manual page in OUT_DIR ({}): {error}",
            out_dir.display()
        );
    }
    Ok(())
}
