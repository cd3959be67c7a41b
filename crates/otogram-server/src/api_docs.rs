// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document served at `/api/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "otogram API",
        version = "1.0.0",
        description = "Song posts with likes, replies, search and OAuth login.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "auth", description = "OAuth login, session and profile"),
        (name = "posts", description = "Feed, posts, likes and replies"),
        (name = "search", description = "Post and user search"),
        (name = "uploads", description = "Image uploads"),
        (name = "twitter", description = "Twitter connection for cross-posting"),
        (name = "health", description = "Health checks")
    ),
    paths(
        crate::routes::auth::login_spotify,
        crate::routes::auth::callback_spotify,
        crate::routes::auth::login_twitter,
        crate::routes::auth::callback_twitter,
        crate::routes::auth::logout,
        crate::routes::auth::get_current_user,
        crate::routes::auth::update_profile,
        crate::routes::posts::list_posts,
        crate::routes::posts::create_post,
        crate::routes::likes::toggle_like,
        crate::routes::replies::create_reply,
        crate::routes::replies::list_replies,
        crate::routes::search::search_posts,
        crate::routes::search::search_users,
        crate::routes::upload::upload_image,
        crate::routes::twitter::check_connection,
        crate::routes::twitter::disconnect,
        crate::routes::health::health_check,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::routes::auth::MessageResponse,
        crate::routes::auth::UpdateProfileRequest,
        crate::routes::posts::CreatePostRequest,
        crate::routes::likes::LikeResponse,
        crate::routes::replies::CreateReplyRequest,
        crate::routes::twitter::ConnectionResponse,
        crate::routes::upload::UploadResponse,
        otogram_server_auth::User,
        otogram_server_auth::UserProfile,
        otogram_server_auth::Provider,
        otogram_server_db::Post,
        otogram_server_db::Reply,
        otogram_server_db::SongType,
        otogram_server_db::SearchScope,
    ))
)]
pub struct ApiDoc;
