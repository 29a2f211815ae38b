pub fn net_summary_key(user_id: &str) -> String {
    format!("net_summary:{}", user_id)
}
