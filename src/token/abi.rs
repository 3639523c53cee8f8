//! ERC-20 interface bindings.

use alloy::sol;

sol! {
    /// The subset of ERC-20 the dashboard talks to.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC20 {
        /// Emitted on every balance movement, including mints and burns.
        event Transfer(address indexed from, address indexed to, uint256 value);

        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 value) external returns (bool);
    }
}
