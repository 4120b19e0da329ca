//! Real browser control over the Chrome DevTools Protocol.
//!
//! [`BrowserConfig`] is always available so configuration can be validated
//! without a browser. The driver itself, [`CdpDriver`], needs the `browser`
//! feature and a Chromium binary.

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// CDP driver (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tracing::{debug, info};

    use crate::driver::{ElementHandle, SessionFactory, StorageSnapshot, StorefrontDriver};
    use crate::locator::{js_str, Selector};
    use crate::result::{ProbeError, ProbeResult};

    fn launch_error(e: impl std::fmt::Display) -> ProbeError {
        ProbeError::BrowserLaunch {
            message: e.to_string(),
        }
    }

    fn driver_error(e: impl std::fmt::Display) -> ProbeError {
        ProbeError::driver(e.to_string())
    }

    /// Chromium session driven over CDP
    #[derive(Debug)]
    pub struct CdpDriver {
        browser: Arc<Mutex<CdpBrowser>>,
        page: Arc<Mutex<CdpPage>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl CdpDriver {
        /// Launch a browser and open a blank page
        ///
        /// # Errors
        ///
        /// Returns [`ProbeError::BrowserLaunch`] if Chromium cannot be started.
        pub async fn launch(config: &BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder.build().map_err(launch_error)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(launch_error)?;
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(launch_error)?;
            info!(headless = config.headless, "browser launched");
            Ok(Self {
                browser: Arc::new(Mutex::new(browser)),
                page: Arc::new(Mutex::new(page)),
                handle,
            })
        }

        async fn eval<T: DeserializeOwned>(&self, expr: String) -> ProbeResult<T> {
            let page = self.page.lock().await;
            page.evaluate(expr)
                .await
                .map_err(driver_error)?
                .into_value()
                .map_err(driver_error)
        }

        /// Run `body` against element `nth` of `selector`; false if absent
        async fn with_element(&self, selector: &Selector, nth: usize, body: &str) -> ProbeResult<()> {
            let expr = format!(
                "(() => {{ const el = {}[{nth}]; if (!el) return false; {body} return true; }})()",
                selector.to_js_collect()
            );
            if self.eval::<bool>(expr).await? {
                Ok(())
            } else {
                Err(ProbeError::not_found(format!("{selector} [{nth}]")))
            }
        }
    }

    #[async_trait]
    impl StorefrontDriver for CdpDriver {
        async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
            let page = self.page.lock().await;
            let _ = page.goto(url).await.map_err(|e| {
                ProbeError::driver(format!("navigation to {url} failed: {e}"))
            })?;
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            let page = self.page.lock().await;
            let url = page.url().await.map_err(driver_error)?;
            Ok(url.unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn query_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
            let expr = format!(
                "{}.map((el, index) => {{ \
                   const r = el.getBoundingClientRect(); \
                   const s = window.getComputedStyle(el); \
                   const field = el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement; \
                   return {{ index, \
                     text: field ? el.value : (el.innerText || el.textContent || ''), \
                     visible: r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none' }}; \
                 }})",
                selector.to_js_collect()
            );
            self.eval(expr).await
        }

        async fn click(&mut self, selector: &Selector, nth: usize) -> ProbeResult<()> {
            debug!(%selector, nth, "cdp click");
            self.with_element(selector, nth, "el.scrollIntoView({block: 'center'}); el.click();")
                .await
        }

        async fn type_text(&mut self, selector: &Selector, nth: usize, text: &str) -> ProbeResult<()> {
            let body = format!(
                "el.focus(); el.value = {}; \
                 el.dispatchEvent(new Event('input', {{bubbles: true}})); \
                 el.dispatchEvent(new Event('change', {{bubbles: true}}));",
                js_str(text)
            );
            self.with_element(selector, nth, &body).await
        }

        async fn clear_storage(&mut self) -> ProbeResult<()> {
            {
                let page = self.page.lock().await;
                let _ = page
                    .execute(ClearBrowserCookiesParams::default())
                    .await
                    .map_err(driver_error)?;
            }
            // storage is unreachable on about:blank, which is already empty
            self.eval::<bool>(
                "(() => { try { localStorage.clear(); sessionStorage.clear(); } catch (e) {} return true; })()"
                    .to_string(),
            )
            .await
            .map(|_| ())
        }

        async fn storage_snapshot(&self) -> ProbeResult<StorageSnapshot> {
            let cookies = {
                let page = self.page.lock().await;
                page.get_cookies().await.map_err(driver_error)?.len()
            };
            let lengths: Vec<usize> = self
                .eval(
                    "(() => { try { return [localStorage.length, sessionStorage.length]; } catch (e) { return [0, 0]; } })()"
                        .to_string(),
                )
                .await?;
            Ok(StorageSnapshot {
                cookies,
                local: lengths.first().copied().unwrap_or_default(),
                session: lengths.get(1).copied().unwrap_or_default(),
            })
        }

        async fn close(&mut self) -> ProbeResult<()> {
            let mut browser = self.browser.lock().await;
            let _ = browser.close().await.map_err(driver_error)?;
            self.handle.abort();
            Ok(())
        }
    }

    /// Opens a fresh browser for every session
    #[derive(Debug, Clone, Default)]
    pub struct CdpSessionFactory {
        config: BrowserConfig,
    }

    impl CdpSessionFactory {
        /// Factory launching browsers with `config`
        #[must_use]
        pub const fn new(config: BrowserConfig) -> Self {
            Self { config }
        }
    }

    #[async_trait]
    impl SessionFactory for CdpSessionFactory {
        async fn open(&self) -> ProbeResult<Box<dyn StorefrontDriver>> {
            Ok(Box::new(CdpDriver::launch(&self.config).await?))
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{CdpDriver, CdpSessionFactory};
