//! Access-link building for manager/client account relationships.

/// Build the review-link URL an operator sends to a client.
///
/// Opening it in the client's Ads console lets the client grant the
/// manager account editor access without any API round trip.
pub fn review_link_url(client_entity_id: &str, manager_entity_id: &str) -> String {
    format!(
        "https://advertising.amazon.com/advertisingAccounts/{client_entity_id}/managerAccounts/{manager_entity_id}/review-link-request"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_link_url_shape() {
        let url = review_link_url("ENTITY_CLIENT1", "ENTITY_MANAGER9");
        assert_eq!(
            url,
            "https://advertising.amazon.com/advertisingAccounts/ENTITY_CLIENT1/managerAccounts/ENTITY_MANAGER9/review-link-request"
        );
    }
}
