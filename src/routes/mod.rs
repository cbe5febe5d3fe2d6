/*!
 * Routes Module
 * Route table: which handler serves each path and which methods need the admin token
 */

pub mod auth;
pub mod files;
pub mod health;
pub mod resource;
pub mod singleton;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put, MethodRouter},
    Router,
};

use crate::{
    auth::require_admin,
    resources::kinds::{
        BlogPosts, DownloadableItems, Files, Kind, Portfolio, Projects, SocialLinks, SpotifyTracks,
        StudioConfig, Testimonials, YoutubeVideos,
    },
    state::AppState,
};

/// Who may fetch a single record at `{path}/{id}`.
#[derive(Debug, Clone, Copy)]
enum ItemRead {
    None,
    Public,
    Admin,
}

/// Puts the admin gate in front of every method in `methods`.
fn protected(state: &AppState, methods: MethodRouter<AppState>) -> MethodRouter<AppState> {
    methods.route_layer(from_fn_with_state(state.clone(), require_admin))
}

fn item_path<K: Kind>() -> String {
    format!("{}/{{id}}", K::RESOURCE.path)
}

/// Gated update/delete on `{path}/{id}`, plus the single-record read if any.
fn item_routes<K: Kind>(state: &AppState, read: ItemRead) -> MethodRouter<AppState> {
    let writes = put(resource::update::<K>).delete(resource::delete::<K>);
    match read {
        ItemRead::None => protected(state, writes),
        ItemRead::Public => get(resource::get_one::<K>).merge(protected(state, writes)),
        ItemRead::Admin => protected(state, writes.get(resource::get_one::<K>)),
    }
}

/// Public list, gated create/update/delete.
fn crud<K: Kind>(state: &AppState, read: ItemRead) -> Router<AppState> {
    Router::new()
        .route(
            K::RESOURCE.path,
            get(resource::list_public::<K>).merge(protected(state, post(resource::create::<K>))),
        )
        .route(&item_path::<K>(), item_routes::<K>(state, read))
}

fn singleton<K: Kind>(state: &AppState) -> Router<AppState> {
    Router::new().route(
        K::RESOURCE.path,
        get(singleton::get_singleton::<K>).merge(protected(state, put(singleton::update_singleton::<K>))),
    )
}

fn testimonials(state: &AppState) -> Router<AppState> {
    let path = Testimonials::RESOURCE.path;
    Router::new()
        .route(
            path,
            get(resource::list_public::<Testimonials>).post(resource::create::<Testimonials>),
        )
        .route(
            &format!("{path}/all"),
            protected(state, get(resource::list_all::<Testimonials>)),
        )
        .route(
            &item_path::<Testimonials>(),
            protected(
                state,
                get(resource::get_one::<Testimonials>).delete(resource::delete::<Testimonials>),
            ),
        )
        .route(
            &format!("{path}/{{id}}/approve"),
            protected(state, put(resource::approve::<Testimonials>)),
        )
}

fn files(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            Files::RESOURCE.path,
            get(resource::list_public::<Files>).merge(protected(state, post(files::upload_file))),
        )
        .route(&item_path::<Files>(), item_routes::<Files>(state, ItemRead::None))
}

fn blog_posts(state: &AppState) -> Router<AppState> {
    crud::<BlogPosts>(state, ItemRead::Public).route(
        &format!("{}/all", BlogPosts::RESOURCE.path),
        protected(state, get(resource::list_all::<BlogPosts>)),
    )
}

/// Every application route, without the outer tower layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(auth::login))
        .route(
            "/change-password",
            protected(&state, post(auth::change_password)),
        )
        .merge(singleton::<SocialLinks>(&state))
        .merge(singleton::<StudioConfig>(&state))
        .merge(crud::<Projects>(&state, ItemRead::None))
        .merge(crud::<Portfolio>(&state, ItemRead::None))
        .merge(crud::<SpotifyTracks>(&state, ItemRead::Admin))
        .merge(crud::<YoutubeVideos>(&state, ItemRead::None))
        .merge(crud::<DownloadableItems>(&state, ItemRead::Public))
        .merge(testimonials(&state))
        .merge(files(&state))
        .merge(blog_posts(&state))
        .route("/health", get(health::health_ping))
        .route("/health/database", get(health::health_database))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::testing;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_public_reads_need_no_token() {
        let app = testing::app();
        for uri in [
            "/projects",
            "/portfolio",
            "/testimonials",
            "/social-links",
            "/studio-config",
            "/spotify-tracks",
            "/youtube-videos",
            "/files",
            "/blog-posts",
            "/downloadable-items",
        ] {
            let (status, _) = app.json(Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_writes_need_a_token() {
        let app = testing::app();
        let id = "00000000-0000-4000-8000-000000000000";
        let cases = [
            (Method::POST, "/projects".to_string()),
            (Method::PUT, format!("/portfolio/{id}")),
            (Method::DELETE, format!("/spotify-tracks/{id}")),
            (Method::PUT, format!("/youtube-videos/{id}")),
            (Method::DELETE, format!("/testimonials/{id}")),
            (Method::PUT, format!("/testimonials/{id}/approve")),
            (Method::GET, "/testimonials/all".to_string()),
            (Method::PUT, "/social-links".to_string()),
            (Method::PUT, "/studio-config".to_string()),
            (Method::GET, format!("/testimonials/{id}")),
            (Method::GET, format!("/spotify-tracks/{id}")),
            (Method::POST, "/downloadable-items".to_string()),
            (Method::DELETE, format!("/downloadable-items/{id}")),
            (Method::DELETE, format!("/files/{id}")),
            (Method::POST, "/blog-posts".to_string()),
            (Method::GET, "/blog-posts/all".to_string()),
            (Method::PUT, format!("/blog-posts/{id}")),
            (Method::POST, "/change-password".to_string()),
        ];
        for (method, uri) in cases {
            let (status, _) = app.json(method.clone(), &uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_non_admin_token_is_forbidden() {
        let app = testing::app();
        let token = app.state.tokens.issue("guest").unwrap();
        let (status, body) = app.json(Method::GET, "/blog-posts/all", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["message"].as_str().unwrap().contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_testimonials_have_no_generic_update() {
        let app = testing::app();
        let token = app.admin_token();
        let uri = "/testimonials/00000000-0000-4000-8000-000000000000";
        let (status, _) = app.json(Method::PUT, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_single_record_reads() {
        let app = testing::app();
        let token = app.admin_token();

        let (status, created) = app
            .json(
                Method::POST,
                "/downloadable-items",
                Some(&token),
                Some(json!({
                    "title": "Vocal pack",
                    "description": "Dry vocals",
                    "type": "acapella",
                    "download_url": "https://drive.test/vocals.zip",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/downloadable-items/{}", created["id"].as_str().unwrap());
        let (status, item) = app.json(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["type"], "acapella");

        let (_, track) = app
            .json(
                Method::POST,
                "/spotify-tracks",
                Some(&token),
                Some(json!({ "title": "Song", "artist": "Me", "spotifyId": "4uLU6hMCjMI75M1A2tKUQC" })),
            )
            .await;
        let uri = format!("/spotify-tracks/{}", track["id"].as_str().unwrap());
        let (status, fetched) = app.json(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["spotifyId"], "4uLU6hMCjMI75M1A2tKUQC");

        let (_, testimonial) = app
            .json(
                Method::POST,
                "/testimonials",
                None,
                Some(json!({ "name": "Fan", "rating": 5, "comment": "Wow" })),
            )
            .await;
        let uri = format!("/testimonials/{}", testimonial["id"].as_str().unwrap());
        let (status, pending) = app.json(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pending["approved"], false);
    }

    #[tokio::test]
    async fn test_blog_approval_must_be_boolean_on_update() {
        let app = testing::app();
        let token = app.admin_token();
        let (_, created) = app
            .json(
                Method::POST,
                "/blog-posts",
                Some(&token),
                Some(json!({ "title": "t", "content": "c", "author": "a" })),
            )
            .await;
        let uri = format!("/blog-posts/{}", created["id"].as_str().unwrap());
        let (status, _) = app
            .json(Method::PUT, &uri, Some(&token), Some(json!({ "approved": "yes" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, post) = app.json(Method::GET, &uri, None, None).await;
        assert_eq!(post["approved"], false);
    }
}
