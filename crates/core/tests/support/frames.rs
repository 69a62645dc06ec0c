use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use richchat_core::{FrameHandle, SilentFrameHost};
use richchat_domain::Result as DomainResult;
use url::Url;

/// How the authorization endpoint answers inside the hidden frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameScript {
    /// Redirect back with a token valid for `expires_in` seconds
    Token { expires_in: u64 },
    /// Redirect back with a state that was never issued
    WrongState,
    /// Redirect back with an OAuth error
    ProviderError,
    /// Never finish loading
    Hang,
}

/// Scripted `SilentFrameHost` that records frame usage.
#[derive(Debug)]
pub struct ScriptedFrames {
    script: Mutex<FrameScript>,
    created: AtomicUsize,
    removed: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl ScriptedFrames {
    pub fn new(script: FrameScript) -> Self {
        Self {
            script: Mutex::new(script),
            created: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn set_script(&self, script: FrameScript) {
        *self.script.lock().unwrap() = script;
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    /// Number of refresh navigations performed so far.
    pub fn refreshes(&self) -> usize {
        self.navigations.lock().unwrap().len()
    }

    pub fn last_navigation(&self) -> Option<Url> {
        self.navigations.lock().unwrap().last().and_then(|url| Url::parse(url).ok())
    }
}

/// Value of one query parameter of `url`.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
}

#[async_trait]
impl SilentFrameHost for ScriptedFrames {
    async fn create_frame(&self) -> DomainResult<FrameHandle> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(FrameHandle::new())
    }

    async fn navigate(&self, _frame: FrameHandle, url: &str) -> DomainResult<String> {
        let count = {
            let mut navigations = self.navigations.lock().unwrap();
            navigations.push(url.to_string());
            navigations.len()
        };
        let script = self.script.lock().unwrap().clone();
        let state = Url::parse(url)
            .ok()
            .and_then(|parsed| query_param(&parsed, "state"))
            .unwrap_or_default();

        match script {
            FrameScript::Token { expires_in } => Ok(format!(
                "https://app.example.com/#access_token=access-{count}&token_type=Bearer&expires_in={expires_in}&state={state}"
            )),
            FrameScript::WrongState => Ok(format!(
                "https://app.example.com/#access_token=access-{count}&expires_in=3600&state=forged"
            )),
            FrameScript::ProviderError => Ok(format!(
                "https://app.example.com/#error=interaction_required&error_description=Login+required&state={state}"
            )),
            FrameScript::Hang => std::future::pending().await,
        }
    }

    fn remove_frame(&self, _frame: FrameHandle) {
        self.removed.fetch_add(1, Ordering::SeqCst);
    }
}
