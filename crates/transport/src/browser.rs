//! Browser automation
//!
//! The UI surface is driven through Playwright: a step list is compiled to a
//! one-shot script and executed with `node`, blocking until the browser run
//! finishes. The step primitives are the small set the entity factories
//! need: navigate, fill, select, toggle, click, wait.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::HarnessConfig;
use crate::error::{Result, TransportError};

/// One browser action.
#[derive(Debug, Clone, PartialEq)]
pub enum UiStep {
    Navigate { url: String },
    Fill { selector: String, value: String },
    Select { selector: String, value: String },
    Check { selector: String },
    Uncheck { selector: String },
    Click { selector: String },
    WaitFor { selector: String, timeout_ms: u64 },
    Screenshot { name: String },
}

/// Drive a browser through a list of steps.
pub trait BrowserDriver {
    fn run(&self, steps: &[UiStep]) -> Result<()>;
}

/// Playwright-backed browser session.
pub struct BrowserSession {
    base_url: String,
    browser: String,
    headless: bool,
    screenshot_dir: PathBuf,
}

impl BrowserSession {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        check_playwright_installed()?;
        std::fs::create_dir_all(&config.browser.screenshot_dir)?;
        Ok(Self {
            base_url: config.base_url(),
            browser: config.browser.browser.clone(),
            headless: config.browser.headless,
            screenshot_dir: config.browser.screenshot_dir.clone(),
        })
    }

    /// Compile a step list to a Playwright script.
    pub fn build_script(&self, steps: &[UiStep]) -> String {
        let mut script = format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const page = await (await browser.newContext()).newPage();
  const baseUrl = '{base_url}';

  try {{
"#,
            browser = self.browser,
            headless = self.headless,
            base_url = js_quote(&self.base_url),
        );

        for step in steps {
            script.push_str("    ");
            script.push_str(&self.step_to_js(step));
            script.push('\n');
        }

        script.push_str(
            r#"    console.log(JSON.stringify({ success: true }));
  } catch (error) {
    console.error(JSON.stringify({ success: false, error: error.message }));
    process.exit(1);
  } finally {
    await browser.close();
  }
})();
"#,
        );
        script
    }

    fn step_to_js(&self, step: &UiStep) -> String {
        match step {
            UiStep::Navigate { url } => {
                format!("await page.goto(baseUrl + '{}');", js_quote(url))
            }
            UiStep::Fill { selector, value } => {
                format!(
                    "await page.fill('{}', '{}');",
                    js_quote(selector),
                    js_quote(value)
                )
            }
            UiStep::Select { selector, value } => {
                format!(
                    "await page.selectOption('{}', '{}');",
                    js_quote(selector),
                    js_quote(value)
                )
            }
            UiStep::Check { selector } => {
                format!("await page.check('{}');", js_quote(selector))
            }
            UiStep::Uncheck { selector } => {
                format!("await page.uncheck('{}');", js_quote(selector))
            }
            UiStep::Click { selector } => {
                format!("await page.click('{}');", js_quote(selector))
            }
            UiStep::WaitFor { selector, timeout_ms } => {
                format!(
                    "await page.waitForSelector('{}', {{ timeout: {} }});",
                    js_quote(selector),
                    timeout_ms
                )
            }
            UiStep::Screenshot { name } => {
                let path = self.screenshot_dir.join(format!("{name}.png"));
                format!(
                    "await page.screenshot({{ path: '{}' }});",
                    js_quote(&path.to_string_lossy())
                )
            }
        }
    }
}

impl BrowserDriver for BrowserSession {
    fn run(&self, steps: &[UiStep]) -> Result<()> {
        let script = self.build_script(steps);
        let dir = tempfile::tempdir()?;
        let script_path = dir.path().join("session.js");
        std::fs::write(&script_path, &script)?;

        debug!(script = %script_path.display(), steps = steps.len(), "running browser script");

        let output = Command::new("node")
            .arg(&script_path)
            .current_dir(dir.path())
            .output()
            .map_err(|e| TransportError::Spawn {
                program: "node".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(TransportError::Browser(format!(
                "stdout: {}\nstderr: {}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            )));
        }
        Ok(())
    }
}

fn check_playwright_installed() -> Result<()> {
    let status = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(TransportError::PlaywrightNotFound),
    }
}

fn js_quote(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> BrowserSession {
        BrowserSession {
            base_url: "https://foundry.example.com".to_string(),
            browser: "chromium".to_string(),
            headless: true,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
        }
    }

    #[test]
    fn test_script_contains_all_steps() {
        let steps = vec![
            UiStep::Navigate { url: "/organizations/new".to_string() },
            UiStep::Fill {
                selector: "#organization_name".to_string(),
                value: "acme".to_string(),
            },
            UiStep::Click { selector: "input[name=commit]".to_string() },
            UiStep::WaitFor {
                selector: ".alert-success".to_string(),
                timeout_ms: 5000,
            },
        ];
        let script = session().build_script(&steps);
        assert!(script.contains("await page.goto(baseUrl + '/organizations/new');"));
        assert!(script.contains("await page.fill('#organization_name', 'acme');"));
        assert!(script.contains("await page.click('input[name=commit]');"));
        assert!(script.contains("timeout: 5000"));
        assert!(script.contains("chromium.launch({ headless: true })"));
    }

    #[test]
    fn test_values_are_quoted() {
        let steps = vec![UiStep::Fill {
            selector: "#name".to_string(),
            value: "o'brien".to_string(),
        }];
        let script = session().build_script(&steps);
        assert!(script.contains(r"o\'brien"));
    }
}
