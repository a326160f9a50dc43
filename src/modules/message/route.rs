use actix_web::web::{scope, ServiceConfig};

use crate::modules::message::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/messages")
            // literal segments before parameterized siblings
            .service(unread_count)
            .service(delete_conversation)
            .service(send_message)
            .service(list_conversations)
            .service(mark_thread_read)
            .service(fetch_thread)
            .service(delete_message),
    );
}
