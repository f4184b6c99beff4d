/// Masks the local part of an email address for logs and admin views.
///
/// The first two characters of the local part are kept (only the first when the
/// local part is two characters or shorter) and the rest become `*`. The domain
/// is left as is. Anything without an `@` is returned unchanged.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let length = local.chars().count();
    if length == 0 {
        return email.to_string();
    }

    let visible = if length <= 2 { 1 } else { 2 };
    let kept: String = local.chars().take(visible).collect();
    format!("{kept}{}@{domain}", "*".repeat(length - visible))
}
