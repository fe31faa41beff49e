//! Every user-visible notification text.

use abi::config::ProductConfig;
use abi::model::User;

pub fn added_back(from: &User) -> String {
    format!("{} added you back!", from.mention())
}

pub fn added_as_friend(from: &User) -> String {
    format!("{} added you as a friend!", from.mention())
}

pub fn friend_message(from: &User, text: &str) -> String {
    format!("{}: {}", from.display_name(), text)
}

pub fn invitation(from: &User, title: &str) -> String {
    format!("{}: Are you down for \"{}\"?", from.display_name(), title)
}

pub fn also_interested(from: &User, title: &str) -> String {
    format!("{} is also interested in {}!", from.display_name(), title)
}

pub fn event_comment(from: &User, title: &str, text: &str) -> String {
    format!("{} to {}: {}", from.display_name(), title, text)
}

pub fn auth_code(product: &ProductConfig, code: &str) -> String {
    format!("Your {} code: {}", product.name, code)
}

pub fn share_link(product: &ProductConfig, link_id: &str) -> String {
    format!("{}/{}", product.share_link_base.trim_end_matches('/'), link_id)
}

pub fn shared_plans(from: &User, link: &str) -> String {
    format!("{} shared their plans with you - {}", from.display_name(), link)
}

/// sms wording for "added you" pushes: the trailing `!` moves after the product name
pub fn added_friend_sms(product: &ProductConfig, message: &str) -> String {
    let message = message.strip_suffix('!').unwrap_or(message);
    format!("{} on {}! - {}", message, product.name, product.app_link)
}

pub fn with_download_footer(product: &ProductConfig, message: &str) -> String {
    format!(
        "{}\n--\nDownload {} to reply - {}",
        message, product.name, product.app_link
    )
}
