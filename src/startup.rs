use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthenticationService;
use crate::configuration::JwtSettings;
use crate::logger::RequestLogger;
use crate::routes::{health_check, refresh, sign_in};
use crate::store::SessionStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn SessionStore>,
    jwt: JwtSettings,
) -> Result<Server, std::io::Error> {
    let service = web::Data::new(AuthenticationService::new(store, jwt));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(service.clone())
            .route("/health_check", web::get().to(health_check))
            .route("/auth/sign-in", web::post().to(sign_in))
            .route("/auth/refresh", web::post().to(refresh))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
