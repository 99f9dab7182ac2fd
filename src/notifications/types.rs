//! Notification message rendering.
//!
//! Messages are rendered to HTML fragments at creation time and stored
//! verbatim, so a notification survives renames and deletions of whatever
//! triggered it. Usernames are restricted to alphanumerics at registration,
//! which keeps them safe to embed.

/// "User X followed you."
pub fn render_follow(base_url: &str, follower_username: &str) -> String {
    format!(
        r#"User <a href="{}/user/{}">{}</a> followed you."#,
        base_url, follower_username, follower_username
    )
}

/// "This photo has new comment/reply."
pub fn render_comment(base_url: &str, photo_id: i32) -> String {
    format!(
        r#"<a href="{}/photo/{}#comments">This photo</a> has new comment/reply."#,
        base_url, photo_id
    )
}

/// "User X collected your photo."
pub fn render_collect(base_url: &str, collector_username: &str, photo_id: i32) -> String {
    format!(
        r#"User <a href="{}/user/{}">{}</a> collected your <a href="{}/photo/{}">photo</a>."#,
        base_url, collector_username, collector_username, base_url, photo_id
    )
}
