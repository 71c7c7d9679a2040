use crate::collectors::command;
use crate::config::ReachabilityMethod;
use crate::models::Reachability;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, TcpStream};
use tokio::time;

#[derive(Debug, Clone, Copy)]
pub struct ReachabilitySettings {
    pub method: ReachabilityMethod,
    pub tcp_port: u16,
    pub timeout: Duration,
}

fn ping_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"time[=<]\s*(\d+(?:\.\d+)?)\s*ms").expect("valid ping regex"))
}

/// Latency reported by `ping`, rounded to whole milliseconds.
pub fn parse_ping_latency(output: &str) -> Option<u64> {
    let captures = ping_time_regex().captures(output)?;
    let millis = captures[1].parse::<f64>().ok()?;
    Some(millis.round() as u64)
}

/// Single reachability attempt. Never fails: every problem becomes `unreachable`.
pub async fn check(address: &str, settings: &ReachabilitySettings) -> Reachability {
    let start = Instant::now();
    let result = match settings.method {
        ReachabilityMethod::Ping => ping(address, settings.timeout).await,
        ReachabilityMethod::Tcp => tcp_connect(address, settings.tcp_port, settings.timeout).await,
    };
    debug!(
        "reachability check of {} took: {} ms",
        address,
        start.elapsed().as_millis()
    );
    result
}

async fn ping(address: &str, timeout: Duration) -> Reachability {
    let wait_secs = timeout.as_secs().max(1);
    let args = vec![
        "-c".to_string(),
        "1".to_string(),
        "-W".to_string(),
        wait_secs.to_string(),
        address.to_string(),
    ];
    let start = Instant::now();

    // ping enforces -W itself; the extra second covers process start-up.
    let outcome = time::timeout(timeout + Duration::from_secs(1), command::run("ping", &args)).await;
    match outcome {
        Ok(Ok(output)) if output.success() => {
            let latency = parse_ping_latency(&output.stdout)
                .unwrap_or_else(|| start.elapsed().as_millis() as u64);
            Reachability::reachable(latency)
        }
        Ok(Ok(_)) => {
            debug!("ping {} got no reply", address);
            Reachability::unreachable()
        }
        Ok(Err(e)) => {
            debug!("ping {} failed: {}", address, e);
            Reachability::unreachable()
        }
        Err(_) => {
            debug!("ping {} timed out", address);
            Reachability::unreachable()
        }
    }
}

async fn tcp_connect(address: &str, port: u16, timeout: Duration) -> Reachability {
    let start = Instant::now();
    let attempt = async {
        let socket_addr = lookup_host((address, port))
            .await?
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address"))?;
        TcpStream::connect(socket_addr).await
    };

    match time::timeout(timeout, attempt).await {
        Ok(Ok(_stream)) => Reachability::reachable(start.elapsed().as_millis() as u64),
        Ok(Err(e)) => {
            debug!("tcp connect to {}:{} failed: {}", address, port, e);
            Reachability::unreachable()
        }
        Err(_) => {
            debug!("tcp connect to {}:{} timed out", address, port);
            Reachability::unreachable()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_ping_latency() {
        let output = "PING web01 (10.0.0.5) 56(84) bytes of data.\n64 bytes from 10.0.0.5: icmp_seq=1 ttl=64 time=0.741 ms\n";
        assert_eq!(parse_ping_latency(output), Some(1));
        assert_eq!(parse_ping_latency("icmp_seq=1 ttl=57 time=23.4 ms"), Some(23));
        assert_eq!(parse_ping_latency("Reply from 10.0.0.5: bytes=32 time<1ms TTL=128"), Some(1));
        assert_eq!(parse_ping_latency("100% packet loss"), None);
    }

    #[tokio::test]
    async fn test_tcp_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let settings = ReachabilitySettings {
            method: ReachabilityMethod::Tcp,
            tcp_port: port,
            timeout: Duration::from_secs(2),
        };

        let result = check("127.0.0.1", &settings).await;
        assert!(result.reachable);
        assert!(result.latency_ms.is_some());
    }

    #[tokio::test]
    async fn test_tcp_refused_is_unreachable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let settings = ReachabilitySettings {
            method: ReachabilityMethod::Tcp,
            tcp_port: port,
            timeout: Duration::from_secs(2),
        };

        let result = check("127.0.0.1", &settings).await;
        assert_eq!(result, Reachability::unreachable());
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_unreachable() {
        let settings = ReachabilitySettings {
            method: ReachabilityMethod::Tcp,
            tcp_port: 22,
            timeout: Duration::from_secs(2),
        };
        let result = check("no-such-host.invalid", &settings).await;
        assert!(!result.reachable);
        assert_eq!(result.latency_ms, None);
    }
}
