mod test_ws_close_releases_pairing;
mod test_ws_forwards_text_verbatim;
mod test_ws_silent_client_is_evicted;
