/// Maps a workload's public host to the hostnames entered into a policy.
pub trait ExpandHosts: Send + Sync {
    fn expand(&self, host: &str) -> Vec<String>;
}

/// Enters the public host as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHosts;

impl ExpandHosts for IdentityHosts {
    #[inline]
    fn expand(&self, host: &str) -> Vec<String> {
        vec![host.to_string()]
    }
}

impl<F> ExpandHosts for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn expand(&self, host: &str) -> Vec<String> {
        (self)(host)
    }
}

/// Drops repeated hosts, keeping the first occurrence of each.
pub(crate) fn dedup(hosts: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(hosts.len());
    for host in hosts {
        if !out.contains(host) {
            out.push(host.clone());
        }
    }
    out
}
