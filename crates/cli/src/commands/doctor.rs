use braseiro_backend::HttpStatusSource;
use braseiro_core::config::{AppConfig, LoadOptions};
use braseiro_core::StoreStatusSource;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let (webhook, status_endpoint) = check_backend_endpoints(&config);
            checks.push(webhook);
            checks.push(status_endpoint);
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "webhook_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "store_status_endpoint",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_backend_endpoints(config: &AppConfig) -> (DoctorCheck, DoctorCheck) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            let details = format!("failed to initialize async runtime: {error}");
            return (
                DoctorCheck {
                    name: "webhook_reachability",
                    status: CheckStatus::Fail,
                    details: details.clone(),
                },
                DoctorCheck { name: "store_status_endpoint", status: CheckStatus::Fail, details },
            );
        }
    };

    runtime.block_on(async {
        (check_webhook(config).await, check_status_endpoint(config).await)
    })
}

/// Any HTTP answer counts as reachable; the webhook only accepts POSTed
/// orders, so a 404 or 405 on a bare GET is still a healthy sign.
async fn check_webhook(config: &AppConfig) -> DoctorCheck {
    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.backend.timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "webhook_reachability",
                status: CheckStatus::Fail,
                details: format!("http client construction failed: {error}"),
            };
        }
    };

    match client.get(&config.backend.webhook_url).send().await {
        Ok(response) => DoctorCheck {
            name: "webhook_reachability",
            status: CheckStatus::Pass,
            details: format!(
                "`{}` answered with status {}",
                config.backend.webhook_url,
                response.status()
            ),
        },
        Err(error) => DoctorCheck {
            name: "webhook_reachability",
            status: CheckStatus::Fail,
            details: format!("could not reach `{}`: {error}", config.backend.webhook_url),
        },
    }
}

async fn check_status_endpoint(config: &AppConfig) -> DoctorCheck {
    let source = match HttpStatusSource::new(&config.backend) {
        Ok(source) => source,
        Err(error) => {
            return DoctorCheck {
                name: "store_status_endpoint",
                status: CheckStatus::Fail,
                details: format!("http client construction failed: {error}"),
            };
        }
    };

    match source.fetch().await {
        Ok(status) => DoctorCheck {
            name: "store_status_endpoint",
            status: CheckStatus::Pass,
            details: format!(
                "`{}` reports the store {}",
                config.backend.status_url,
                if status.is_open { "open" } else { "closed" }
            ),
        },
        Err(error) => DoctorCheck {
            name: "store_status_endpoint",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
