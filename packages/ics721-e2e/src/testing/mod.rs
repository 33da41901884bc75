mod fixtures;
mod multihop;
mod scenarios;
mod sim;
