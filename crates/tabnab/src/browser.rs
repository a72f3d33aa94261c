//! Google Chrome automation through AppleScript

use crate::error::Error;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Lists every tab as `<url> || <title> || <active>`, one per line
pub(crate) const LIST_TABS_SCRIPT: &str = r#"set output to ""
tell application "Google Chrome"
    set windowIndex to 1
    repeat with w in windows
        set activeIndex to active tab index of w
        set tabIndex to 1
        repeat with t in tabs of w
            set isActive to (windowIndex is 1) and (tabIndex is activeIndex)
            set output to output & (URL of t) & " || " & (title of t) & " || " & isActive & linefeed
            set tabIndex to tabIndex + 1
        end repeat
        set windowIndex to windowIndex + 1
    end repeat
end tell
return output"#;

/// Returns the live DOM of the first tab showing `{{target_url}}`
pub(crate) const TAB_SOURCE_SCRIPT: &str = r#"tell application "Google Chrome"
    repeat with w in windows
        repeat with t in tabs of w
            if (URL of t) is "{{target_url}}" then
                return execute t javascript "document.documentElement.outerHTML"
            end if
        end repeat
    end repeat
end tell
error "No tab is showing {{target_url}}""#;

/// Fill `{{key}}` placeholders, escaping values for AppleScript string literals
pub(crate) fn render_script(template: &str, model: &[(&str, &str)]) -> String {
    model.iter().fold(template.to_string(), |script, (key, value)| {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        script.replace(&format!("{{{{{key}}}}}"), &escaped)
    })
}

/// Run a script through `osascript`, returning its standard output
pub(crate) async fn run_osascript(script: &str) -> Result<String, Error> {
    debug!(bytes = script.len(), "Running AppleScript");

    let mut child = Command::new("osascript")
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Automation(format!("failed to start osascript: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(script.as_bytes())
            .await
            .map_err(|e| Error::Automation(format!("failed to send script: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| Error::Automation(format!("osascript did not finish: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(Error::Automation(if stderr.is_empty() {
            format!("osascript exited with {}", output.status)
        } else {
            stderr
        }));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .trim_end_matches('\n')
        .to_string())
}
