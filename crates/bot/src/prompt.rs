//! Prompt text handed to the decision oracle each cycle.

use perp_agent_core::MarketState;

/// Renders the market snapshot and news, followed by the reply schema.
#[must_use]
pub fn build_prompt(state: &MarketState, news: &str) -> String {
    let mut prompt = format!(
        "CURRENT STATE ({symbol} perpetual):\n\
         Price: {price}\n\
         Change 5m: {change}%\n\
         RSI 14 (5m): {rsi_5m}\n\
         RSI 14 (1h): {rsi_1h}\n\
         Liquidity depth: {depth}\n\
         Available USDT: {balance}\n\
         Recent news:\n{news}\n",
        symbol = state.symbol,
        price = state.last_price,
        change = state.change_5m.round_dp(2),
        rsi_5m = state.rsi_5m.round_dp(2),
        rsi_1h = state.rsi_1h.round_dp(2),
        depth = state.liquidity_depth.round_dp(3),
        balance = state.balance_usdt.round_dp(2),
    );
    prompt.push('\n');
    prompt.push_str(
        "Analyse multi-timeframe momentum, order book liquidity and news sentiment.\n\
         Reply with ONLY a JSON object of this shape:\n\
         {\n\
         \x20 \"action\": \"LONG\" | \"SHORT\" | \"HOLD\" | \"CLOSE_ALL\",\n\
         \x20 \"leverage\": 50-100,\n\
         \x20 \"sizePercentOfEquity\": 5-15,\n\
         \x20 \"reasoning\": \"short explanation\",\n\
         \x20 \"confidence\": 0-100\n\
         }\n",
    );

    prompt
}
