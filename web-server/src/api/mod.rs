// web-server/src/api/mod.rs
pub mod auth;
pub mod context;
pub mod game_options;
pub mod interactive;
pub mod nft_claim;
pub mod proposals;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("", web::get().to(auth::api_index))
            .route("/auth/token", web::get().to(auth::token))
            .route("/admin", web::get().to(auth::admin_status))
            .service(
                web::resource("/context")
                    .route(web::get().to(context::get_context))
                    .route(web::post().to(context::update_context)),
            )
            .service(
                web::resource(vec!["/proposals", "/proposal"])
                    .route(web::get().to(proposals::list_proposals))
                    .route(web::post().to(proposals::submit_proposal))
                    .route(web::put().to(proposals::update_proposal)),
            )
            .service(
                web::resource(vec!["/proposals/vote", "/proposal/vote"])
                    .route(web::post().to(proposals::vote)),
            )
            .route("/proposals/winners", web::get().to(proposals::list_winners))
            .service(
                web::resource("/nft-claim")
                    .route(web::get().to(nft_claim::claim_status))
                    .route(web::post().to(nft_claim::submit_claim)),
            )
            .service(
                web::resource("/game-options")
                    .route(web::get().to(game_options::get_game_options))
                    .route(web::post().to(game_options::set_game_options)),
            )
            .route("/interactive", web::post().to(interactive::post_message)),
    );
}
