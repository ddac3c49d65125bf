//! `DescribeAutoScalingGroups` response format

use serde::Deserialize;

use crate::error::{FleetError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct DescribeGroupsEnvelope {
    #[serde(rename = "DescribeAutoScalingGroupsResponse", default)]
    pub response: Option<DescribeGroupsResponse>,
    #[serde(rename = "Error", default)]
    pub error: Option<AwsApiError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DescribeGroupsResponse {
    #[serde(rename = "DescribeAutoScalingGroupsResult", default)]
    pub result: Option<DescribeGroupsResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DescribeGroupsResult {
    #[serde(rename = "AutoScalingGroups", default)]
    pub groups: Option<Vec<AutoScalingGroup>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutoScalingGroup {
    #[serde(rename = "AutoScalingGroupName", default)]
    pub name: Option<String>,
    #[serde(rename = "Instances", default)]
    pub instances: Option<Vec<FleetMember>>,
}

/// One instance of an Auto Scaling group
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FleetMember {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "LifecycleState", default)]
    pub lifecycle_state: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AwsApiError {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// Extract the members of `group_name` from a response body
///
/// An `Error` object takes precedence over everything else in the body.
///
/// # Errors
/// `Decode` for non-JSON bodies, `Api` for error responses, `NoGroup` and
/// `NoInstances` when the answer is structurally fine but empty.
pub fn parse_members(group_name: &str, body: &[u8]) -> Result<Vec<FleetMember>> {
    let envelope: DescribeGroupsEnvelope = serde_json::from_slice(body)?;

    if let Some(error) = envelope.error
        && !error.code.is_empty()
    {
        return Err(FleetError::Api {
            code: error.code,
            message: error.message,
        });
    }

    let group = envelope
        .response
        .and_then(|r| r.result)
        .and_then(|r| r.groups)
        .and_then(|groups| groups.into_iter().next())
        .ok_or_else(|| FleetError::NoGroup(group_name.to_string()))?;

    let members = group.instances.unwrap_or_default();
    if members.is_empty() {
        return Err(FleetError::NoInstances(group_name.to_string()));
    }

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_members() {
        let body = br#"{
            "DescribeAutoScalingGroupsResponse": {
                "DescribeAutoScalingGroupsResult": {
                    "AutoScalingGroups": [{
                        "AutoScalingGroupName": "my-asg",
                        "Instances": [
                            {"InstanceId": "i-0a", "LifecycleState": "InService"},
                            {"InstanceId": "i-0b", "LifecycleState": "Terminating"}
                        ]
                    }],
                    "NextToken": null
                },
                "ResponseMetadata": {"RequestId": "abc"}
            }
        }"#;

        let members = parse_members("my-asg", body).unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].instance_id, "i-0a");
        assert_eq!(members[1].lifecycle_state, "Terminating");
    }

    #[test]
    fn test_error_object_takes_precedence() {
        let body = br#"{
            "Error": {"Code": "SignatureDoesNotMatch", "Message": "bad signature", "Type": "Sender"},
            "DescribeAutoScalingGroupsResponse": {
                "DescribeAutoScalingGroupsResult": {
                    "AutoScalingGroups": [{"Instances": [{"InstanceId": "i-0a"}]}]
                }
            },
            "RequestId": "abc"
        }"#;

        let err = parse_members("my-asg", body).unwrap_err();

        assert!(matches!(err, FleetError::Api { ref code, .. } if code == "SignatureDoesNotMatch"));
    }

    #[test]
    fn test_unknown_group_is_error() {
        let body = br#"{"DescribeAutoScalingGroupsResponse": {"DescribeAutoScalingGroupsResult": {"AutoScalingGroups": []}}}"#;

        assert!(matches!(
            parse_members("typo-asg", body),
            Err(FleetError::NoGroup(name)) if name == "typo-asg"
        ));
    }

    #[test]
    fn test_group_without_instances_is_error() {
        let body = br#"{"DescribeAutoScalingGroupsResponse": {"DescribeAutoScalingGroupsResult": {"AutoScalingGroups": [{"Instances": []}]}}}"#;

        assert!(matches!(
            parse_members("my-asg", body),
            Err(FleetError::NoInstances(_))
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            parse_members("my-asg", b"<html>gateway timeout</html>"),
            Err(FleetError::Decode(_))
        ));
        assert!(matches!(
            parse_members("my-asg", b"{}"),
            Err(FleetError::NoGroup(_))
        ));
    }
}
