mod test_disconnect_notifies_partner;
mod test_partner_requeue;
