use serde::{Deserialize, Serialize};

/// The envelope every endpoint resolves with. Endpoints returning more than a
/// success flag and a message have their own response type below.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterTokenResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganization {
    pub organizationname: String,
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub organizationname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub organization: Option<Organization>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub username: String,
    pub password: String,
    /// `true` registers the user as an administrator of the organization.
    pub role: bool,
    pub organization: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationsResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "organList", default)]
    pub organ_list: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
    /// `true` for organization administrators.
    #[serde(default)]
    pub role: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_user_serialization() {
        let user = RegisterUser {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada1815".to_string(),
            password: "Engine99!".to_string(),
            role: true,
            organization: "Acme".to_string(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({
                "firstname": "Ada",
                "lastname": "Lovelace",
                "email": "ada@example.com",
                "username": "ada1815",
                "password": "Engine99!",
                "role": true,
                "organization": "Acme",
            })
        );
    }

    #[test]
    fn create_organization_response_parsing() {
        let response: CreateOrganizationResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Organization saved",
            "organization": { "organizationname": "Acme", "location": "Berlin" }
        }))
        .unwrap();
        assert!(response.success);
        assert_eq!(
            response.organization.unwrap().organizationname,
            "Acme".to_string()
        );

        // A failure comes without the organization payload.
        let response: CreateOrganizationResponse = serde_json::from_value(json!({
            "success": false,
            "message": "Organization name already taken"
        }))
        .unwrap();
        assert!(!response.success);
        assert!(response.organization.is_none());
    }

    #[test]
    fn organizations_response_parsing() {
        let response: OrganizationsResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Organizations found",
            "organList": ["Acme", "Globex"]
        }))
        .unwrap();
        assert_eq!(
            response.organ_list,
            vec!["Acme".to_string(), "Globex".to_string()]
        );

        // The list is absent on failures.
        let response: OrganizationsResponse = serde_json::from_value(json!({
            "success": false,
            "message": "No token provided"
        }))
        .unwrap();
        assert!(response.organ_list.is_empty());
    }

    #[test]
    fn api_result_parsing() {
        let result: ApiResult =
            serde_json::from_value(json!({ "success": false, "message": "Username is taken" }))
                .unwrap();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Username is taken"));

        // Some endpoints omit the message entirely.
        let result: ApiResult = serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(result.success);
        assert!(result.message.is_none());
    }

    #[test]
    fn login_response_parsing() {
        let response: LoginResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Success",
            "token": "abc.def.ghi"
        }))
        .unwrap();
        assert_eq!(response.token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn profile_response_parsing() {
        let response: ProfileResponse = serde_json::from_value(json!({
            "success": true,
            "profile": {
                "username": "ada1815",
                "email": "ada@example.com",
                "organization": "Acme",
                "role": true
            }
        }))
        .unwrap();
        let profile = response.profile.unwrap();
        assert_eq!(profile.username, "ada1815");
        assert!(profile.role);
    }
}
