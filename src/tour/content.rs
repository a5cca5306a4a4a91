//! Built-in walkthrough content for the cloud dashboard.

use super::position::Side;
use super::step::Step;

/// Steps of the default dashboard tour, in order.
///
/// Steps without a target element fall back to a centered tooltip whatever
/// side they request.
pub fn dashboard_steps() -> Vec<Step> {
    vec![
        Step::new(
            "welcome",
            "Welcome to CloudGuard!",
            "I'm Cirrus, your cloud assistant! I'll help you get started with monitoring and \
             optimizing your cloud infrastructure across AWS, Azure, and GCP.",
        )
        .with_side(Side::Center),
        Step::new(
            "dashboard-overview",
            "Dashboard Overview",
            "This is your main dashboard. Here you can see important metrics from all your cloud \
             providers at a glance. We monitor costs, security, and performance in one unified view.",
        )
        .with_target("dashboard-overview-section")
        .with_route("/"),
        Step::new(
            "connect-aws",
            "Connect Your Cloud Providers",
            "First, let's connect your cloud accounts to monitor resources, security, and costs. \
             CloudGuard supports AWS, Azure, and Google Cloud Platform.",
        )
        .with_target("cloud-providers-nav")
        .with_route("/cloud-providers"),
        Step::new(
            "aws-credentials",
            "Adding Your AWS Account",
            "Enter your AWS Access Key ID and Secret Key to connect your account. We'll securely \
             store these credentials and use them to monitor your resources.",
        )
        .with_side(Side::Center)
        .with_route("/cloud-providers"),
        Step::new(
            "security-monitoring",
            "Security Monitoring",
            "CloudGuard automatically scans for security configuration drifts and compliance \
             issues in your infrastructure, checking against standards like CIS, HIPAA, and PCI DSS.",
        )
        .with_target("security-monitoring-section")
        .with_route("/security"),
        Step::new(
            "security-drifts",
            "Security Configuration Drifts",
            "We detect when your cloud resources deviate from your security baseline, so potential \
             vulnerabilities are caught before they're exploited.",
        )
        .with_side(Side::Right)
        .with_route("/security"),
        Step::new(
            "cost-optimization",
            "Cost Optimization",
            "We analyze your usage patterns to recommend ways to reduce cloud spending: idle \
             resources, right-sizing opportunities, and reserved instance recommendations.",
        )
        .with_target("cost-optimization-section")
        .with_route("/cost"),
        Step::new(
            "cost-prediction",
            "Cost Prediction",
            "Forecasts of your future cloud costs help you budget effectively and avoid unexpected \
             expenses at the end of the month.",
        )
        .with_side(Side::Bottom)
        .with_route("/cost-prediction"),
        Step::new(
            "resource-utilization",
            "Resource Utilization",
            "Monitor how efficiently you're using your cloud resources. We track CPU, memory, \
             storage, and network utilization.",
        )
        .with_side(Side::Right)
        .with_route("/resources"),
        Step::new(
            "alerts-setup",
            "Set Up Alerts",
            "Configure notifications for cost anomalies and security issues, delivered to Slack, \
             email, or other channels.",
        )
        .with_target("alerts-section")
        .with_route("/alerts"),
        Step::new(
            "slack-integration",
            "Slack Integration",
            "Connect CloudGuard to your Slack workspace to receive real-time alerts and reports in \
             the channels you choose.",
        )
        .with_side(Side::Right)
        .with_route("/settings"),
        Step::new(
            "settings-customization",
            "Customize Your Experience",
            "Visit the Settings page to customize your dashboard, notification preferences, and \
             alert thresholds.",
        )
        .with_side(Side::Bottom)
        .with_route("/settings"),
        Step::new(
            "ai-insights",
            "AI-Powered Insights",
            "Personalized recommendations get more accurate over time as CloudGuard learns from \
             your infrastructure.",
        )
        .with_side(Side::Center)
        .with_route("/"),
        Step::new(
            "completed",
            "All Set!",
            "You're ready to start monitoring your cloud infrastructure. Click the cloud icon in \
             the bottom right corner whenever you need help.",
        )
        .with_side(Side::Center),
    ]
}
