pub mod mock_dispatcher;

use alarm_router::{AlarmEvent, AlarmRecord};
use serde_json::{json, Value};

pub const SUBSCRIPTION_ARN: &str =
    "arn:aws:sns:eu-west-1:123456789012:cloudwatch-alarms:2bcfbf39-05c3-41de-beaa-fcfcc21c8f55";

/// A CloudWatch alarm message as SNS delivers it.
pub fn alarm_message(name: &str, namespace: &str, new_state: &str) -> Value {
    json!({
        "AlarmName": name,
        "AlarmDescription": null,
        "AWSAccountId": "123456789012",
        "NewStateValue": new_state,
        "NewStateReason": "Threshold Crossed: 1 datapoint [3.0 (02/10/19 17:03:00)] was greater than the threshold (0.0).",
        "StateChangeTime": "2019-10-02T17:04:40.091+0000",
        "Region": "EU (Ireland)",
        "OldStateValue": "OK",
        "Trigger": {
            "MetricName": "FailedRows",
            "Namespace": namespace,
            "StatisticType": "Statistic",
            "Statistic": "SUM",
            "Unit": null,
            "Dimensions": [],
            "Period": 300,
            "EvaluationPeriods": 1,
            "ComparisonOperator": "GreaterThanThreshold",
            "Threshold": 0.0,
            "TreatMissingData": "- TreatMissingData:                    missing",
            "EvaluateLowSampleCountPercentile": ""
        }
    })
}

pub fn record(message: &Value) -> AlarmRecord {
    AlarmRecord {
        subscription_arn: SUBSCRIPTION_ARN.to_string(),
        sns_message: message.to_string(),
        timestamp: "2019-10-02T17:04:40.091Z".to_string(),
    }
}

pub fn batch(records: Vec<AlarmRecord>) -> AlarmEvent {
    AlarmEvent { records }
}
