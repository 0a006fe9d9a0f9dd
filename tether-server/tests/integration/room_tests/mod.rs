mod test_health_endpoint;
mod test_host_then_client;
