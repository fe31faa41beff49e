mod accounts;
mod friend_graph;

pub use accounts::Accounts;
pub use friend_graph::FriendGraph;
