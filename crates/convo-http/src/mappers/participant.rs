//! Participant model → entity mapper

use convo_core::Participant;

use crate::models::ParticipantModel;

/// Convert ParticipantModel to Participant entity
impl From<ParticipantModel> for Participant {
    fn from(model: ParticipantModel) -> Self {
        Participant {
            user_id: model.user_id,
            display_name: model.display_name,
            online: model.online,
            last_seen: model.last_seen_at,
        }
    }
}
