//! One browser session per scenario.

use crate::config::Settings;
use crate::driver::BrowserDriver;
use crate::logging::Logger;
use crate::result::ProbeResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Driver plus the settings and logger every page object receives
#[derive(Debug, Clone)]
pub struct Session {
    driver: Arc<dyn BrowserDriver>,
    settings: Arc<Settings>,
    logger: Logger,
}

impl Session {
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, settings: Arc<Settings>, logger: Logger) -> Self {
        Self {
            driver,
            settings,
            logger,
        }
    }

    #[must_use]
    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Close the underlying page and browser
    pub async fn close(&self) -> ProbeResult<()> {
        self.logger.debug("closing session");
        self.driver.close().await
    }
}

/// Starts a fresh session for each scenario attempt
#[async_trait]
pub trait SessionLauncher: Send + Sync + std::fmt::Debug {
    async fn launch(&self, settings: Arc<Settings>, logger: Logger) -> ProbeResult<Session>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;

    #[tokio::test]
    async fn test_session_delegates_to_driver() {
        let driver = Arc::new(MockDriver::new());
        driver.set_url("https://x/web/index.php/auth/login");
        let session = Session::new(
            driver.clone(),
            Arc::new(Settings::default()),
            Logger::default(),
        );

        assert_eq!(
            session.current_url().await.unwrap(),
            "https://x/web/index.php/auth/login"
        );
        session.close().await.unwrap();
        assert!(driver.is_closed());
    }
}
