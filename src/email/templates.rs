/// Email template functions
use super::{send_email, EmailResult};

/// Send the account confirmation email
pub async fn send_confirmation_email(
    to: &str,
    username: &str,
    token: &str,
    base_url: &str,
) -> EmailResult<()> {
    let confirm_link = format!("{}/auth/confirm/{}", base_url, token);

    let body_text = format!(
        r#"Hello {},

Thank you for registering!

Please confirm your account by clicking the link below:
{}

This link will expire in 1 hour.

If you did not create an account, please ignore this email.
"#,
        username, confirm_link
    );

    let body_html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Confirm Your Account</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>Confirm Your Account</h2>
        <p>Hello <strong>{}</strong>,</p>
        <p>Thank you for registering. Please confirm your account to start sharing photos.</p>
        <p style="margin: 30px 0;">
            <a href="{}"
               style="background-color: #28a745; color: white; padding: 12px 24px;
                      text-decoration: none; border-radius: 4px; display: inline-block;">
                Confirm Account
            </a>
        </p>
        <p>Or copy and paste this link into your browser:</p>
        <p style="word-break: break-all; color: #28a745;">{}</p>
        <p><strong>This link will expire in 1 hour.</strong></p>
        <hr style="margin: 30px 0; border: none; border-top: 1px solid #ddd;">
        <p style="color: #666; font-size: 0.9em;">
            If you did not create an account, please ignore this email.
        </p>
    </div>
</body>
</html>"#,
        username, confirm_link, confirm_link
    );

    send_email(to, "Confirm Your Account", &body_text, Some(&body_html)).await
}

/// Send a password reset email
pub async fn send_password_reset_email(
    to: &str,
    username: &str,
    token: &str,
    base_url: &str,
) -> EmailResult<()> {
    let reset_link = format!("{}/auth/reset-password/{}", base_url, token);

    let body_text = format!(
        r#"Hello {},

You have requested to reset your password.

Click the link below to reset your password:
{}

This link will expire in 1 hour.

If you did not request a password reset, please ignore this email.
"#,
        username, reset_link
    );

    let body_html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Password Reset</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>Password Reset Request</h2>
        <p>Hello <strong>{}</strong>,</p>
        <p>You have requested to reset your password.</p>
        <p style="margin: 30px 0;">
            <a href="{}"
               style="background-color: #007bff; color: white; padding: 12px 24px;
                      text-decoration: none; border-radius: 4px; display: inline-block;">
                Reset Password
            </a>
        </p>
        <p>Or copy and paste this link into your browser:</p>
        <p style="word-break: break-all; color: #007bff;">{}</p>
        <p><strong>This link will expire in 1 hour.</strong></p>
        <hr style="margin: 30px 0; border: none; border-top: 1px solid #ddd;">
        <p style="color: #666; font-size: 0.9em;">
            If you did not request a password reset, please ignore this email.
        </p>
    </div>
</body>
</html>"#,
        username, reset_link, reset_link
    );

    send_email(to, "Password Reset Request", &body_text, Some(&body_html)).await
}

/// Send the email-change confirmation to the new address
pub async fn send_change_email_email(
    to: &str,
    username: &str,
    token: &str,
    base_url: &str,
) -> EmailResult<()> {
    let change_link = format!("{}/auth/change-email/{}", base_url, token);

    let body_text = format!(
        r#"Hello {},

You have requested to change your account email to this address.

Click the link below to confirm the change:
{}

This link will expire in 1 hour.

If you did not request this change, please ignore this email.
"#,
        username, change_link
    );

    let body_html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Confirm Email Change</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>Confirm Email Change</h2>
        <p>Hello <strong>{}</strong>,</p>
        <p>You have requested to change your account email to this address.</p>
        <p style="margin: 30px 0;">
            <a href="{}"
               style="background-color: #007bff; color: white; padding: 12px 24px;
                      text-decoration: none; border-radius: 4px; display: inline-block;">
                Confirm Email Change
            </a>
        </p>
        <p>Or copy and paste this link into your browser:</p>
        <p style="word-break: break-all; color: #007bff;">{}</p>
        <p><strong>This link will expire in 1 hour.</strong></p>
        <hr style="margin: 30px 0; border: none; border-top: 1px solid #ddd;">
        <p style="color: #666; font-size: 0.9em;">
            If you did not request this change, please ignore this email.
        </p>
    </div>
</body>
</html>"#,
        username, change_link, change_link
    );

    send_email(to, "Confirm Email Change", &body_text, Some(&body_html)).await
}
