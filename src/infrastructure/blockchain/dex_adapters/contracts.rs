//! Contract bindings for the read-only calls the venues need

use ethers::prelude::abigen;

abigen!(
    KyberNetworkProxy,
    r#"[
        function getExpectedRate(address src, address dest, uint256 srcQty) external view returns (uint256 expectedRate, uint256 worstRate)
    ]"#
);

abigen!(
    UniswapV2Pair,
    r#"[
        function token0() external view returns (address)
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
    ]"#
);
