use actix_web::web::{scope, ServiceConfig};

use crate::modules::friendship::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friendships")
            // literal segments before parameterized siblings
            .service(list_requests)
            .service(list_friends)
            .service(send_request)
            .service(respond_to_request)
            .service(cancel_request)
            .service(remove_friend),
    );
}
