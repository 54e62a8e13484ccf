use std::time::Duration;

use async_trait::async_trait;
use fake_user_agent::get_chrome_rua;
use thirtyfour::{
    error::WebDriverError, By, ChromiumLikeCapabilities, Cookie, DesiredCapabilities, WebDriver,
};
use url::Url;

const LINKEDIN_ORIGIN: &str = "https://www.linkedin.com";
const SESSION_COOKIE_NAME: &str = "li_at";

/// Snapshot of a fully loaded document. The browser session that produced
/// it is already gone by the time this exists.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    html: String,
}

impl RenderedPage {
    pub fn new(html: String) -> Self {
        RenderedPage { html }
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("page load timeout exceeded")]
    Timeout,
    #[error("session cookie was rejected, landed on {0}")]
    AuthRejected(String),
    #[error("webdriver failure: {0}")]
    Browser(#[from] WebDriverError),
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RenderedPage, FetchError>;
}

/// Drives a remote WebDriver session. One exclusive browser session per
/// fetch; the session is quit on every exit path.
pub struct BrowserFetcher {
    webdriver_url: String,
    session_cookie: String,
    page_load_timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(webdriver_url: String, session_cookie: String, page_load_timeout: Duration) -> Self {
        BrowserFetcher {
            webdriver_url,
            session_cookie,
            page_load_timeout,
        }
    }

    async fn connect(&self) -> Result<WebDriver, WebDriverError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless")?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg("--window-size=1920,1080")?;
        caps.add_arg(&format!("--user-agent={}", get_chrome_rua()))?;

        WebDriver::new(&self.webdriver_url, caps).await
    }

    /// Authentication happens against the site origin before the target
    /// url is ever requested.
    async fn load(&self, driver: &WebDriver, url: &Url) -> Result<String, FetchError> {
        driver.goto(LINKEDIN_ORIGIN).await?;

        let mut cookie = Cookie::new(SESSION_COOKIE_NAME, self.session_cookie.clone());
        cookie.domain = Some(".linkedin.com".to_string());
        cookie.path = Some("/".to_string());
        driver.add_cookie(cookie).await?;

        driver.goto(url.as_str()).await?;

        // Wait for the document body, then nudge lazy content into view.
        driver.find(By::Tag("body")).await?;
        driver
            .execute("window.scrollTo(0, document.body.scrollHeight / 2);", vec![])
            .await?;
        tokio::time::sleep(Duration::from_secs(3)).await;

        let landed_on = driver.current_url().await?;
        if is_auth_wall(&landed_on) {
            return Err(FetchError::AuthRejected(landed_on.to_string()));
        }

        Ok(driver.source().await?)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url) -> Result<RenderedPage, FetchError> {
        let driver = self.connect().await?;

        let loaded = match tokio::time::timeout(self.page_load_timeout, self.load(&driver, url))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        };

        // Quit no matter how the navigation went. A session left behind
        // would leak a browser on the webdriver host.
        if let Err(e) = driver.quit().await {
            log::error!("Failed to quit webdriver session: {:?}", e);
        }

        loaded.map(RenderedPage::new)
    }
}

/// LinkedIn bounces unauthenticated sessions to a login or authwall page
/// instead of failing the navigation.
fn is_auth_wall(url: &Url) -> bool {
    let path = url.path();
    path.starts_with("/login")
        || path.starts_with("/authwall")
        || path.starts_with("/checkpoint")
        || path.starts_with("/uas/login")
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::is_auth_wall;

    #[test]
    fn login_and_authwall_urls_are_rejections() {
        for url in [
            "https://www.linkedin.com/login",
            "https://www.linkedin.com/authwall?trk=gf",
            "https://www.linkedin.com/checkpoint/challenge/abc",
            "https://www.linkedin.com/uas/login?session_redirect=%2Fcompany%2Facme",
        ] {
            assert!(is_auth_wall(&Url::parse(url).unwrap()), "{}", url);
        }
    }

    #[test]
    fn target_pages_are_not_rejections() {
        for url in [
            "https://www.linkedin.com/company/acme/",
            "https://www.linkedin.com/in/some-person/",
            "https://www.linkedin.com/feed/update/urn:li:activity:1/",
        ] {
            assert!(!is_auth_wall(&Url::parse(url).unwrap()), "{}", url);
        }
    }
}
