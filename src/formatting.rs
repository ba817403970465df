// src/formatting.rs

use crate::core::{
    format_timestamp, ActionTarget, AlarmContext, AlarmState, CardAction, CardFact,
    CardSection, MessageCard, TemplateVars,
};
use crate::error::Result;

/// Percent-encodes an alarm name for use inside a URL.
pub fn quote(alarm_name: &str) -> String {
    urlencoding::encode(alarm_name).into_owned()
}

/// Link to the alarm in the CloudWatch console.
pub fn console_url(region: &str, alarm_name: &str) -> String {
    format!(
        "https://console.aws.amazon.com/cloudwatch/home?region={}#alarm:alarmFilter=ANY;name={}",
        region,
        quote(alarm_name)
    )
}

/// Renders a threshold the way it reads in the CloudWatch payload: whole
/// numbers keep a trailing `.0`.
pub fn format_threshold(threshold: f64) -> String {
    if threshold.is_finite() && threshold.fract() == 0.0 && threshold.abs() < 1e16 {
        format!("{:.1}", threshold)
    } else {
        threshold.to_string()
    }
}

/// The one-line description of the trigger shown on the card.
pub fn trigger_text(alarm: &AlarmContext) -> String {
    let trigger = &alarm.message.trigger;
    format!(
        "{} {} {} {} for {} period(s) of {} seconds.",
        trigger.statistic,
        trigger.metric_name,
        trigger.comparison_operator,
        format_threshold(trigger.threshold),
        trigger.evaluation_periods,
        trigger.period
    )
}

/// Builds the variables for the alarm email template.
pub fn build_template_vars(alarm: &AlarmContext) -> TemplateVars {
    let message = &alarm.message;
    let trigger = &message.trigger;
    TemplateVars {
        alarm_name: message.alarm_name.clone(),
        statistic: trigger.statistic.clone(),
        metric_name: trigger.metric_name.clone(),
        operator: trigger.comparison_operator.clone(),
        threshold: trigger.threshold,
        eval_periods: trigger.evaluation_periods,
        period: trigger.period,
        time: format_timestamp(&alarm.timestamp),
        old_state: message.old_state.clone(),
        new_state: message.new_state.clone(),
        reason: message.reason.clone(),
        region: alarm.region.clone(),
        quoted_alarm_name: quote(&message.alarm_name),
    }
}

/// Builds the chat card for an alarm transition.
///
/// Fails with `UnknownState` when the new state has no theme colour.
pub fn build_message_card(alarm: &AlarmContext) -> Result<MessageCard> {
    let message = &alarm.message;
    let state: AlarmState = message.new_state.parse()?;

    let facts = vec![
        fact("Time", format_timestamp(&alarm.timestamp)),
        fact("Old State", message.old_state.clone()),
        fact("New State", message.new_state.clone()),
        fact("Reason", message.reason.clone()),
    ];

    Ok(MessageCard {
        card_type: "MessageCard".to_string(),
        context: "https://schema.org/extensions".to_string(),
        summary: format!("AWS Cloudwatch Alarm: {} has transitioned", message.alarm_name),
        title: "AWS Cloudwatch Alarm".to_string(),
        theme_color: state.theme_color().to_string(),
        sections: vec![CardSection {
            title: format!("{} has transitioned", message.alarm_name),
            text: trigger_text(alarm),
            facts,
        }],
        potential_action: vec![CardAction {
            action_type: "OpenUri".to_string(),
            name: "Link to Alarm".to_string(),
            targets: vec![ActionTarget {
                os: "default".to_string(),
                uri: console_url(&alarm.region, &message.alarm_name),
            }],
        }],
    })
}

fn fact(name: &str, value: String) -> CardFact {
    CardFact {
        name: name.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_timestamp, AlarmMessage, Trigger};
    use crate::error::RouterError;

    fn create_test_alarm(name: &str, new_state: &str) -> AlarmContext {
        AlarmContext {
            message: AlarmMessage {
                alarm_name: name.to_string(),
                old_state: "OK".to_string(),
                new_state: new_state.to_string(),
                reason: "Threshold Crossed: 1 datapoint [42.0] was greater than the threshold (40.0)."
                    .to_string(),
                trigger: Trigger {
                    namespace: "AWS/EC2".to_string(),
                    statistic: "AVERAGE".to_string(),
                    metric_name: "CPUUtilization".to_string(),
                    comparison_operator: "GreaterThanThreshold".to_string(),
                    threshold: 40.0,
                    evaluation_periods: 1,
                    period: 300,
                },
            },
            timestamp: parse_timestamp("2019-10-02T17:04:40.091Z").unwrap(),
            region: "eu-west-1".to_string(),
        }
    }

    #[test]
    fn test_format_threshold() {
        assert_eq!(format_threshold(40.0), "40.0");
        assert_eq!(format_threshold(0.5), "0.5");
        assert_eq!(format_threshold(-3.0), "-3.0");
        assert_eq!(format_threshold(99.95), "99.95");
    }

    #[test]
    fn test_trigger_text() {
        let alarm = create_test_alarm("HighCPU", "ALARM");
        assert_eq!(
            trigger_text(&alarm),
            "AVERAGE CPUUtilization GreaterThanThreshold 40.0 for 1 period(s) of 300 seconds."
        );
    }

    #[test]
    fn test_console_url_encodes_reserved_characters() {
        let url = console_url("us-east-1", "Disk full & slow");
        assert_eq!(
            url,
            "https://console.aws.amazon.com/cloudwatch/home?region=us-east-1#alarm:alarmFilter=ANY;name=Disk%20full%20%26%20slow"
        );
    }

    #[test]
    fn test_card_keeps_raw_name_outside_link() {
        let alarm = create_test_alarm("Disk full & slow", "ALARM");
        let card = build_message_card(&alarm).unwrap();

        assert_eq!(card.summary, "AWS Cloudwatch Alarm: Disk full & slow has transitioned");
        assert_eq!(card.sections[0].title, "Disk full & slow has transitioned");
        assert!(card.potential_action[0].targets[0]
            .uri
            .ends_with("name=Disk%20full%20%26%20slow"));
    }

    #[test]
    fn test_card_layout() {
        let alarm = create_test_alarm("HighCPU", "INSUFFICIENT_DATA");
        let card = build_message_card(&alarm).unwrap();

        assert_eq!(card.card_type, "MessageCard");
        assert_eq!(card.title, "AWS Cloudwatch Alarm");
        assert_eq!(card.theme_color, "fce94f");
        assert_eq!(card.sections.len(), 1);

        let names: Vec<&str> = card.sections[0].facts.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Time", "Old State", "New State", "Reason"]);
        assert_eq!(card.sections[0].facts[0].value, "2019-10-02T17:04:40.091000+00:00");
        assert_eq!(card.sections[0].facts[2].value, "INSUFFICIENT_DATA");

        let action = &card.potential_action[0];
        assert_eq!(action.action_type, "OpenUri");
        assert_eq!(action.name, "Link to Alarm");
        assert_eq!(action.targets[0].os, "default");
    }

    #[test]
    fn test_card_rejects_unknown_state() {
        let alarm = create_test_alarm("HighCPU", "BROKEN");
        assert!(matches!(
            build_message_card(&alarm),
            Err(RouterError::UnknownState(s)) if s == "BROKEN"
        ));
    }

    #[test]
    fn test_template_vars() {
        let alarm = create_test_alarm("Nightly load", "ALARM");
        let vars = build_template_vars(&alarm);

        assert_eq!(vars.alarm_name, "Nightly load");
        assert_eq!(vars.quoted_alarm_name, "Nightly%20load");
        assert_eq!(vars.operator, "GreaterThanThreshold");
        assert_eq!(vars.threshold, 40.0);
        assert_eq!(vars.eval_periods, 1);
        assert_eq!(vars.period, 300);
        assert_eq!(vars.time, "2019-10-02T17:04:40.091000+00:00");
        assert_eq!(vars.old_state, "OK");
        assert_eq!(vars.new_state, "ALARM");
        assert_eq!(vars.region, "eu-west-1");
    }
}
