use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use inquire::Confirm;
use nowcast_core::{
    Config, Coordinate, IpGeolocation, LocationError, LocationService, Permission,
};
use parking_lot::Mutex;
use tracing::warn;

/// Blocking yes/no question put to the user.
pub type Prompt = Arc<dyn Fn() -> anyhow::Result<bool> + Send + Sync>;

/// Terminal prompt asking whether the IP lookup may be used.
pub fn terminal_prompt() -> Prompt {
    Arc::new(|| {
        Ok(Confirm::new("Look up your approximate location from your IP address?")
            .with_default(true)
            .with_help_message("Declining uses the fallback location from the config file")
            .prompt()?)
    })
}

/// IP lookup that asks the user before the first use and remembers the answer.
pub struct AskFirst {
    inner: IpGeolocation,
    /// Config as stored on disk; the answer is written back into it.
    stored: Config,
    config_path: PathBuf,
    prompt: Prompt,
    permission: Mutex<Permission>,
}

impl std::fmt::Debug for AskFirst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AskFirst")
            .field("inner", &self.inner)
            .field("config_path", &self.config_path)
            .field("permission", &*self.permission.lock())
            .finish_non_exhaustive()
    }
}

impl AskFirst {
    pub fn new(inner: IpGeolocation, stored: Config, config_path: PathBuf, prompt: Prompt) -> Self {
        let permission = Permission::from_setting(stored.location.auto_detect);
        Self { inner, stored, config_path, prompt, permission: Mutex::new(permission) }
    }
}

#[async_trait]
impl LocationService for AskFirst {
    fn permission(&self) -> Permission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> Permission {
        let prompt = Arc::clone(&self.prompt);
        let asked = tokio::task::spawn_blocking(move || prompt()).await;

        let allowed = match asked {
            Ok(Ok(allowed)) => allowed,
            Ok(Err(e)) => {
                warn!(error = %e, "location prompt failed");
                return Permission::Denied;
            }
            Err(e) => {
                warn!(error = %e, "location prompt task failed");
                return Permission::Denied;
            }
        };

        let mut config = self.stored.clone();
        config.location.auto_detect = Some(allowed);
        if let Err(e) = config.save_to(&self.config_path) {
            warn!(error = %e, "could not remember location choice");
        }

        let permission = Permission::from_setting(Some(allowed));
        *self.permission.lock() = permission;
        permission
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.inner.current_position().await
    }
}
