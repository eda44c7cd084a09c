use basekit_responses::literals::{keys, messages};
use basekit_responses::{Envelope, InfoBody};

use crate::app::extract::RequestPath;

pub async fn index(RequestPath(path): RequestPath) -> Envelope {
    Envelope::info(messages::API_INFO, InfoBody::default())
        .with_message_key(keys::API_INFO)
        .with_path(path)
}
