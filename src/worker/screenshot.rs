//! screenshot() — §4.4, §6. Adapted from the teacher's `tools/screenshot.rs`
//! viewport-capture branch; the spec's `screenshot` tool takes no selector
//! (elements are addressed by ref, not CSS, and the tool operates on the
//! whole tab) so the element/full-page branches are dropped.

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotParams;
use chromiumoxide::page::Page;

use crate::bridge::ErrorCode;

pub async fn capture(page: &Page) -> Result<String, ErrorCode> {
    use base64::Engine;

    let bytes = page
        .screenshot(CaptureScreenshotParams::builder().build())
        .await
        .map_err(|_| ErrorCode::ScreenshotFailed)?;

    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}
