use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::notify::{Notifier, TwilioNotifier};
use crate::otp::{Clock, OtpLedger, SystemClock};
use crate::users::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub otp: Arc<OtpLedger>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let pool = db::connect(&config.database_url).await?;
        let users = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;

        let notifier = Arc::new(TwilioNotifier::new(&config.twilio)?) as Arc<dyn Notifier>;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let otp = Arc::new(OtpLedger::new(
            time::Duration::seconds(config.otp.ttl_seconds),
            clock,
        ));

        Ok(Self::from_parts(config, users, otp, notifier))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        otp: Arc<OtpLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            users,
            otp,
            notifier,
        }
    }
}
