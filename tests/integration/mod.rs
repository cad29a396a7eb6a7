mod matchmaking_flow;
mod pairing_rules;
