use std::sync::Arc;

use richchat_common::auth::unsigned_token;
use richchat_common::testing::MockClock;
use richchat_common::MemoryStore;
use richchat_core::TokenManager;
use richchat_domain::{AuthConfig, AuthOutcome, ProviderKind};
use serde_json::{json, Map, Value};
use url::Url;

use super::frames::{query_param, FrameScript, ScriptedFrames};

pub const AZURE_SCOPES: &str =
    "openid https://graph.microsoft.com/User.ReadWrite https://graph.microsoft.com/User.ReadBasic.All";

/// A token manager wired to in-memory collaborators
pub struct AuthHarness {
    pub config: AuthConfig,
    pub manager: TokenManager,
    pub clock: MockClock,
    pub session: MemoryStore,
    pub frames: Arc<ScriptedFrames>,
}

impl AuthHarness {
    pub fn azure(scope: &str) -> Self {
        Self::new(ProviderKind::Azure, scope, FrameScript::Token { expires_in: 3600 })
    }

    pub fn new(provider: ProviderKind, scope: &str, script: FrameScript) -> Self {
        let config = AuthConfig {
            provider,
            auth_service: "https://login.example.com/oauth2/authorize".to_string(),
            client_id: "client-1".to_string(),
            redirect_uri: "https://app.example.com/".to_string(),
            scope: scope.to_string(),
            ..AuthConfig::default()
        };
        let clock = MockClock::new();
        let session = MemoryStore::new();
        let frames = Arc::new(ScriptedFrames::new(script));
        let manager = TokenManager::new(
            config.clone(),
            Arc::new(session.clone()),
            frames.clone(),
            Arc::new(clock.clone()),
        )
        .unwrap();
        Self { config, manager, clock, session, frames }
    }

    /// Fresh manager sharing this harness's session storage, as after a
    /// page reload.
    pub fn next_page_load(&self) -> TokenManager {
        TokenManager::new(
            self.config.clone(),
            Arc::new(self.session.clone()),
            self.frames.clone(),
            Arc::new(self.clock.clone()),
        )
        .unwrap()
    }

    /// Run the redirect phase and return the nonce sent to the provider.
    pub fn begin(&self) -> (Url, String) {
        let AuthOutcome::RedirectRequired(url) = self.manager.begin_authentication().unwrap() else {
            panic!("expected a redirect");
        };
        let url = Url::parse(&url).unwrap();
        let nonce = query_param(&url, "nonce").unwrap();
        (url, nonce)
    }

    /// Complete both phases with an id token carrying `nonce`.
    pub fn sign_in(&self) {
        let (_, nonce) = self.begin();
        self.manager.resume_from_redirect(&id_token_fragment(&azure_claims(&nonce))).unwrap();
    }
}

pub fn azure_claims(nonce: &str) -> Value {
    json!({
        "oid": "00000000-0000-0000-0000-000000000001",
        "tid": "tenant-1",
        "name": "Ada Lovelace",
        "preferred_username": "ada@contoso.com",
        "email": "ada@contoso.com",
        "nonce": nonce,
    })
}

/// Redirect fragment carrying an unsigned id token with `claims`.
pub fn id_token_fragment(claims: &Value) -> String {
    let map: Map<String, Value> = claims.as_object().cloned().unwrap_or_default();
    format!("#id_token={}&session_state=abc", unsigned_token(&map).unwrap())
}
