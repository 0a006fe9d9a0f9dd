mod test_client_departures;
