mod test_quotes_api;
