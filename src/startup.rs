//! Client wiring: settings, persisted identity, REST boundary, and the live
//! sync channel for one sharing session.

use crate::api::{CreateSessionRequest, SessionApi};
use crate::config::Settings;
use crate::domain::{IdentityStore, ParticipantId, ResolvedLocation, SessionId};
use crate::shared::ClientError;
use crate::sync::{SyncChannel, WsConnector};

/// A configured sharing client with a stable participant identity.
pub struct ShareClient {
    settings: Settings,
    identity: ParticipantId,
    api: SessionApi,
}

/// A live sharing session: the sync channel plus the link to hand out.
pub struct ActiveShare {
    pub session_id: SessionId,
    pub share_link: String,
    pub channel: SyncChannel,
}

impl ShareClient {
    pub fn new(settings: Settings) -> Result<Self, ClientError> {
        let identity = IdentityStore::new(&settings.identity.path).load_or_generate()?;
        let api = SessionApi::new(settings.api_base())?;
        Ok(Self {
            settings,
            identity,
            api,
        })
    }

    pub fn identity(&self) -> &ParticipantId {
        &self.identity
    }

    pub fn api(&self) -> &SessionApi {
        &self.api
    }

    /// Start sharing `initial_location`, joining `session` when given or
    /// creating a fresh session otherwise.
    pub async fn start_sharing<F>(
        &self,
        session: Option<SessionId>,
        initial_location: ResolvedLocation,
        on_roster: F,
    ) -> Result<ActiveShare, ClientError>
    where
        F: FnMut(Vec<ResolvedLocation>) + Send + 'static,
    {
        let session_id = match session {
            Some(id) => {
                let info = self.api.get_session(&id).await?;
                tracing::info!(
                    session_id = %info.session_id,
                    participants = info.user_count,
                    "Joining existing session"
                );
                info.session_id
            }
            None => {
                self.api
                    .create_session(&CreateSessionRequest {
                        user_id: self.identity.clone(),
                        latitude: initial_location.latitude,
                        longitude: initial_location.longitude,
                        heading: initial_location.heading,
                    })
                    .await?
            }
        };

        let share_link = session_id.share_link(&self.settings.origin(), &self.settings.share.path);
        let channel = SyncChannel::connect(
            WsConnector,
            self.settings.ws_url(&session_id),
            self.identity.clone(),
            initial_location,
            on_roster,
        );

        Ok(ActiveShare {
            session_id,
            share_link,
            channel,
        })
    }
}
